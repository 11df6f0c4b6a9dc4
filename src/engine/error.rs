/*
 * Created on Mon Mar 02 2026
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
    crate::engine::{data::DatumKind, idx::SlotId},
    std::fmt,
};

pub type TableResult<T> = Result<T, TableError>;

#[derive(Debug, PartialEq, Clone)]
/// Everything a table operation can fail with. Mutations validate before
/// they touch any state, so a returned error means the table is exactly as
/// it was.
pub enum TableError {
    /// a query or update referenced an attribute that is not indexed
    UnknownAttribute(Box<str>),
    /// a mutation or reindex touched an attribute excluded from indexing
    ExcludedAttribute(Box<str>),
    /// a back-fill needed a value that neither the record nor a default provides
    MissingAttribute(Box<str>),
    /// the query input is not an acceptable query form
    BadQuery(&'static str),
    /// `remove`/`update` resolved to zero slots
    NoMatch,
    /// slot access hit a tombstone
    Deleted(SlotId),
    /// slot access beyond the end of the store
    OutOfRange(SlotId),
    /// the query handle predates the latest reindex or attribute addition
    StaleHandle,
    /// the value cannot be normalized to hashable index keys
    Unhashable(DatumKind),
    /// the index disagrees with the record store (in-place edits without a reindex)
    StaleIndex(Box<str>),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAttribute(attr) => write!(f, "unknown attribute `{attr}`"),
            Self::ExcludedAttribute(attr) => {
                write!(f, "attribute `{attr}` is excluded from indexing")
            }
            Self::MissingAttribute(attr) => {
                write!(f, "no value or default for attribute `{attr}`")
            }
            Self::BadQuery(reason) => write!(f, "bad query: {reason}"),
            Self::NoMatch => write!(f, "no records matched"),
            Self::Deleted(slot) => write!(f, "slot {slot} holds a removed record"),
            Self::OutOfRange(slot) => write!(f, "slot {slot} is out of range"),
            Self::StaleHandle => {
                write!(f, "the query handle is stale; obtain a fresh one from the table")
            }
            Self::Unhashable(kind) => {
                write!(f, "a {kind:?} value cannot be used as an index key")
            }
            Self::StaleIndex(attr) => write!(
                f,
                "the index for attribute `{attr}` disagrees with the record store; reindex first"
            ),
        }
    }
}

impl std::error::Error for TableError {}
