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
    super::ins,
    crate::{
        engine::{
            core::{
                query::{self, IntoQuery, INDEX_ATTR},
                table::Table,
            },
            data::{key, AttrMap, Datum, RecordData},
            error::{TableError, TableResult},
        },
        util,
    },
    log::debug,
};

/// Write a change set into every selected record: per slot and attribute,
/// withdraw the old value, store the new one, post it. Atomic per call;
/// everything that can refuse does so before the first write.
pub(crate) fn update<R: RecordData>(
    table: &mut Table<R>,
    changes: &AttrMap,
    query: impl IntoQuery<R>,
) -> TableResult<usize> {
    let pairs = changes.iter().map(|(attr, value)| (attr.into(), value.clone())).collect();
    apply(table, pairs, query)
}

/// [`update`] with the change set read off a record: every attribute the
/// record carries is copied onto the selected slots.
pub(crate) fn update_from<R: RecordData>(
    table: &mut Table<R>,
    changes: &R,
    query: impl IntoQuery<R>,
) -> TableResult<usize> {
    let pairs = changes
        .attr_names()
        .into_iter()
        .filter_map(|attr| {
            let value = changes.read_attr(&attr)?;
            Some((attr, value))
        })
        .collect();
    apply(table, pairs, query)
}

fn apply<R: RecordData>(
    table: &mut Table<R>,
    mut pairs: Vec<(Box<str>, Datum)>,
    query: impl IntoQuery<R>,
) -> TableResult<usize> {
    pairs.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    let query = query.into_query(table)?;
    let hits = query::resolve(table, &query)?;
    if hits.is_empty() {
        return util::cold_rerr(TableError::NoMatch);
    }
    if pairs.is_empty() {
        return Ok(hits.len());
    }
    // refuse everything refusable before the first write
    for (attr, value) in &pairs {
        if table.index().is_excluded(attr) {
            return util::cold_rerr(TableError::ExcludedAttribute(attr.clone()));
        }
        if attr.as_ref() == INDEX_ATTR {
            return util::cold_rerr(TableError::BadQuery(
                "the slot pseudo-attribute cannot be written",
            ));
        }
        key::normalize(value)?;
    }
    for slot in hits.iter() {
        let record = table.store().get(slot)?;
        for (attr, _) in &pairs {
            if !table.index().is_indexed(attr) {
                continue; // introduced below
            }
            let Some(old) = record.read_attr(attr) else {
                return util::cold_rerr(TableError::StaleIndex(attr.clone()));
            };
            if !table.index().can_unpost(attr, slot, &old)? {
                return util::cold_rerr(TableError::StaleIndex(attr.clone()));
            }
        }
    }
    for (attr, _) in &pairs {
        if table.index().is_indexed(attr) {
            continue;
        }
        if !table.auto_adds_attributes() {
            return util::cold_rerr(TableError::UnknownAttribute(attr.clone()));
        }
        if !table.has_default() {
            for (_, record) in table.store().iter_live() {
                if record.read_attr(attr).is_none() {
                    return util::cold_rerr(TableError::MissingAttribute(attr.clone()));
                }
            }
        }
    }
    // commit: introduce what is new, then rewrite the selected slots
    let mut introduced = false;
    for (attr, _) in &pairs {
        if !table.index().is_indexed(attr) {
            ins::introduce_attr(table, attr)?;
            introduced = true;
        }
    }
    for slot in hits.iter() {
        for (attr, value) in &pairs {
            let old = table.store().get(slot)?.read_attr(attr);
            table.store_mut().get_mut(slot)?.write_attr(attr, value.clone());
            match old {
                Some(old) => table.index_mut().repost(attr, slot, &old, value)?,
                None => table.index_mut().post(attr, slot, value)?,
            }
        }
    }
    if introduced {
        table.bump_epoch();
    }
    debug!("table {}: updated {} record(s), {} attribute(s) each", table.id(), hits.len(), pairs.len());
    Ok(hits.len())
}
