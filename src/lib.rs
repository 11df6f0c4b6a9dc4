/*
 * Created on Sat Feb 14 2026
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

//! An embedded, schemaless, in-memory table of records.
//!
//! A [`Table`] stores records (attribute → value mappings, or any host type
//! implementing [`RecordData`]) in append-order slots and maintains an
//! inverted index from every indexed attribute to the slots carrying each
//! value, so equality lookups are near-constant-time on any attribute.
//! Queries are small boolean expression trees built from attribute proxies
//! and combined with `&`, `|` and `!`; mutations (`add`, `update`,
//! `remove`, `reindex`) keep the index coherent with the record store.
//!
//! ```
//! use attrtable::{attrmap, Table};
//!
//! let mut songs = Table::new();
//! songs.add(attrmap! { "title" => "Yesterday", "year" => 1965 })?;
//! songs.add(attrmap! { "title" => "Let It Be", "year" => 1970 })?;
//!
//! let q = songs.handle();
//! assert_eq!(songs.count(q.attr("year")?.lt(1970))?, 1);
//! # Ok::<(), attrtable::TableError>(())
//! ```
//!
//! The table is a single-writer structure: `&mut self` on every mutation is
//! the concurrency model. Records handed out through
//! [`Table::get_mut`] can be edited in place, which leaves the index stale
//! until [`Table::reindex`] runs; queries in between answer from the old
//! postings.

mod engine;
mod util;

pub use crate::engine::{
    core::{
        AttrDefault, AttrProxy, CmpOp, IntoQuery, Query, QueryHandle, RecordMode, Records, Table,
        TableBuilder, TableId,
    },
    data::{AttrMap, Datum, DatumKind, IndexKey, OpaqueData, OpaqueKey, RecordData},
    error::{TableError, TableResult},
    idx::SlotId,
};
