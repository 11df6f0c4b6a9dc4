/*
 * Created on Sun Jun 14 2026
 *
 * This file is a part of Attrtable
 * Attrtable is a free and open-source embedded database engine that keeps a
 * schemaless table of records entirely in memory and answers attribute
 * queries through an inverted index, with the vision to provide the
 * flexibility of a database without the weight of one.
 *
 * Copyright (c) 2026, The Attrtable developers
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

use {
    crate::{
        engine::{
            core::{
                query::{self, IntoQuery},
                table::Table,
            },
            data::RecordData,
            error::{TableError, TableResult},
        },
        util,
    },
    log::debug,
};

/// Tombstone every selected record, withdrawing it from every attribute
/// first. Unposting goes by the records' current values, so an index made
/// stale by in-place edits is caught here, before any slot is touched.
pub(crate) fn remove<R: RecordData>(
    table: &mut Table<R>,
    query: impl IntoQuery<R>,
) -> TableResult<usize> {
    let query = query.into_query(table)?;
    let hits = query::resolve(table, &query)?;
    if hits.is_empty() {
        return util::cold_rerr(TableError::NoMatch);
    }
    let attrs = table.index().attribute_names();
    for slot in hits.iter() {
        let record = table.store().get(slot)?;
        for attr in &attrs {
            let Some(value) = record.read_attr(attr) else {
                return util::cold_rerr(TableError::StaleIndex(attr.clone()));
            };
            if !table.index().can_unpost(attr, slot, &value)? {
                return util::cold_rerr(TableError::StaleIndex(attr.clone()));
            }
        }
    }
    let n = hits.len();
    for slot in hits {
        for attr in &attrs {
            // verified above
            if let Some(value) = table.store().get(slot)?.read_attr(attr) {
                table.index_mut().unpost(attr, slot, &value)?;
            }
        }
        table.store_mut().tombstone(slot)?;
    }
    debug!("table {}: removed {n} record(s)", table.id());
    Ok(n)
}
