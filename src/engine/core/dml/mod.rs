/*
 * Created on Sat Jun 06 2026
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

//! The mutation and selection executors behind the table facade. Every
//! mutation validates against the current state first and only then
//! commits, so a returned error means nothing changed.

mod del;
mod ins;
mod sel;
mod upd;

pub use sel::Records;
pub(crate) use {
    del::remove,
    ins::{add, add_attribute, extend, reindex_all, reindex_attr},
    sel::{contains, count, query, query_one},
    upd::{update, update_from},
};

use crate::{
    engine::{
        core::{store::RecordStore, table::AttrDefault},
        data::{Datum, RecordData},
        error::{TableError, TableResult},
        idx::SlotId,
    },
    util,
};

/// The value `slot` carries for `attr`, with the default rule applied: a
/// produced default is written into the record before it is returned, so
/// store and index stay in agreement.
pub(self) fn fill_value<R: RecordData>(
    store: &mut RecordStore<R>,
    slot: SlotId,
    attr: &str,
    default: &mut Option<AttrDefault>,
) -> TableResult<Datum> {
    if let Some(value) = store.get(slot)?.read_attr(attr) {
        return Ok(value);
    }
    match default {
        Some(default) => {
            let value = default.produce();
            store.get_mut(slot)?.write_attr(attr, value.clone());
            Ok(value)
        }
        None => util::cold_rerr(TableError::MissingAttribute(attr.into())),
    }
}
