/*
 * Created on Sun May 10 2026
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
                query::{CmpOp, Expr, IntoQuery, Origin, Query, INDEX_ATTR},
                table::{Table, TableId},
            },
            data::{Datum, RecordData},
            error::{TableError, TableResult},
            idx::FxHashSet,
        },
        util,
    },
    std::{marker::PhantomData, rc::Rc},
};

/// The (table, schema epoch) pair a handle was issued at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HandleStamp {
    pub(crate) table: TableId,
    pub(crate) epoch: u64,
}

/// A snapshot of the table's attribute set at one schema epoch, issuing
/// the proxies that comparison operators turn into query nodes.
///
/// A handle outlived by a `reindex` or an attribute addition is stale:
/// queries built from it fail with
/// [`StaleHandle`](crate::TableError::StaleHandle). Handles asked from the
/// table at query time are always fresh.
#[derive(Debug)]
pub struct QueryHandle<R> {
    stamp: HandleStamp,
    attrs: FxHashSet<Box<str>>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for QueryHandle<R> {
    fn clone(&self) -> Self {
        Self { stamp: self.stamp, attrs: self.attrs.clone(), _record: PhantomData }
    }
}

impl<R: RecordData> QueryHandle<R> {
    pub(crate) fn new(table: &Table<R>) -> Self {
        Self {
            stamp: HandleStamp { table: table.id(), epoch: table.epoch() },
            attrs: table.index().attribute_names().into_iter().collect(),
            _record: PhantomData,
        }
    }
    /// The proxy for `name`, which must be indexed (or the `_index`
    /// pseudo-attribute).
    pub fn attr(&self, name: &str) -> TableResult<AttrProxy<R>> {
        if name != INDEX_ATTR && !self.attrs.contains(name) {
            return util::cold_rerr(TableError::UnknownAttribute(name.into()));
        }
        Ok(AttrProxy { attr: name.into(), stamp: self.stamp, _record: PhantomData })
    }
    /// The proxy addressing records by slot id.
    pub fn index(&self) -> AttrProxy<R> {
        AttrProxy { attr: INDEX_ATTR.into(), stamp: self.stamp, _record: PhantomData }
    }
    /// An O(N) predicate over whole records, for the rare query the index
    /// cannot answer.
    pub fn filter(&self, accept: impl Fn(&R) -> bool + 'static) -> Query<R> {
        Query::new(Expr::Filter(Rc::new(accept)), Origin::Bound(self.stamp))
    }
}

/// An attribute bound to the handle that issued it. Comparison methods
/// produce [`Query`] nodes; a proxy used as a query without a comparison
/// matches nothing.
#[derive(Debug)]
pub struct AttrProxy<R> {
    attr: Box<str>,
    stamp: HandleStamp,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for AttrProxy<R> {
    fn clone(&self) -> Self {
        Self { attr: self.attr.clone(), stamp: self.stamp, _record: PhantomData }
    }
}

impl<R: RecordData> AttrProxy<R> {
    fn node(&self, expr: Expr<R>) -> Query<R> {
        Query::new(expr, Origin::Bound(self.stamp))
    }
    fn cmp(&self, op: CmpOp, value: impl Into<Datum>) -> Query<R> {
        self.node(Expr::Cmp(self.attr.clone(), op, value.into()))
    }
    pub fn eq(&self, value: impl Into<Datum>) -> Query<R> {
        let value = value.into();
        if self.attr.as_ref() == INDEX_ATTR {
            self.node(Expr::IndexIs(value))
        } else {
            self.node(Expr::Eq(self.attr.clone(), value))
        }
    }
    pub fn ne(&self, value: impl Into<Datum>) -> Query<R> {
        self.cmp(CmpOp::Ne, value)
    }
    pub fn lt(&self, value: impl Into<Datum>) -> Query<R> {
        self.cmp(CmpOp::Lt, value)
    }
    pub fn le(&self, value: impl Into<Datum>) -> Query<R> {
        self.cmp(CmpOp::Le, value)
    }
    pub fn gt(&self, value: impl Into<Datum>) -> Query<R> {
        self.cmp(CmpOp::Gt, value)
    }
    pub fn ge(&self, value: impl Into<Datum>) -> Query<R> {
        self.cmp(CmpOp::Ge, value)
    }
}

impl<R: RecordData> IntoQuery<R> for AttrProxy<R> {
    fn into_query(self, _: &Table<R>) -> TableResult<Query<R>> {
        Ok(Query::new(Expr::Incomplete(self.attr), Origin::Bound(self.stamp)))
    }
}

impl<R: RecordData> IntoQuery<R> for &AttrProxy<R> {
    fn into_query(self, table: &Table<R>) -> TableResult<Query<R>> {
        self.clone().into_query(table)
    }
}
