/*
 * Created on Sun Jun 21 2026
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

use crate::engine::{
    core::{
        query::{self, IntoQuery},
        store::RecordStore,
        table::Table,
    },
    data::RecordData,
    error::TableResult,
    idx,
};

/// Records selected by a query, in ascending slot order. Holds either the
/// resolved slot set (lazy, the default) or the pre-fetched records
/// (`always_return_list`); the records and their order are the same
/// either way.
pub struct Records<'a, R> {
    body: Body<'a, R>,
}

enum Body<'a, R> {
    Lazy { slots: idx::IntoIter, store: &'a RecordStore<R> },
    Eager(std::vec::IntoIter<&'a R>),
}

impl<'a, R> Iterator for Records<'a, R> {
    type Item = &'a R;
    fn next(&mut self) -> Option<&'a R> {
        match &mut self.body {
            Body::Lazy { slots, store } => slots.next().and_then(|slot| store.get(slot).ok()),
            Body::Eager(records) => records.next(),
        }
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.body {
            Body::Lazy { slots, .. } => slots.size_hint(),
            Body::Eager(records) => records.size_hint(),
        }
    }
}

pub(crate) fn query<'a, R: RecordData>(
    table: &'a Table<R>,
    query: impl IntoQuery<R>,
) -> TableResult<Records<'a, R>> {
    let query = query.into_query(table)?;
    let hits = query::resolve(table, &query)?;
    let body = if table.always_return_list() {
        let mut records = Vec::with_capacity(hits.len());
        for slot in hits {
            records.push(table.store().get(slot)?);
        }
        Body::Eager(records.into_iter())
    } else {
        Body::Lazy { slots: hits.into_iter(), store: table.store() }
    };
    Ok(Records { body })
}

pub(crate) fn query_one<'a, R: RecordData>(
    table: &'a Table<R>,
    query: impl IntoQuery<R>,
) -> TableResult<Option<&'a R>> {
    let query = query.into_query(table)?;
    let hits = query::resolve(table, &query)?;
    match hits.first() {
        Some(slot) => Ok(Some(table.store().get(slot)?)),
        None => Ok(None),
    }
}

pub(crate) fn count<R: RecordData>(
    table: &Table<R>,
    query: impl IntoQuery<R>,
) -> TableResult<usize> {
    let query = query.into_query(table)?;
    Ok(query::resolve(table, &query)?.len())
}

pub(crate) fn contains<R: RecordData>(
    table: &Table<R>,
    query: impl IntoQuery<R>,
) -> TableResult<bool> {
    let query = query.into_query(table)?;
    Ok(!query::resolve(table, &query)?.is_empty())
}
