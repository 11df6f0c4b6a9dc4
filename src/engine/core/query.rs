/*
 * Created on Sat May 02 2026
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
            core::{handle::HandleStamp, table::Table},
            data::{
                key::{self, IndexKey},
                Datum, RecordData,
            },
            error::{TableError, TableResult},
            idx::SlotSet,
        },
        util,
    },
    std::{
        cmp::Ordering,
        fmt,
        ops::{BitAnd, BitOr, Not},
        rc::Rc,
    },
};

/// The pseudo-attribute addressing records by slot id.
pub(crate) const INDEX_ATTR: &str = "_index";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Ne,
}

impl CmpOp {
    pub(crate) fn admits(self, ord: Ordering) -> bool {
        match self {
            Self::Lt => ord == Ordering::Less,
            Self::Le => ord != Ordering::Greater,
            Self::Gt => ord == Ordering::Greater,
            Self::Ge => ord != Ordering::Less,
            Self::Ne => ord != Ordering::Equal,
        }
    }
    fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Ne => "!=",
        }
    }
}

/// One node of a query tree. Every node evaluates to a set of live slot
/// ids; composition is plain set algebra over those.
pub(crate) enum Expr<R> {
    Eq(Box<str>, Datum),
    Cmp(Box<str>, CmpOp, Datum),
    And(Box<Expr<R>>, Box<Expr<R>>),
    Or(Box<Expr<R>>, Box<Expr<R>>),
    Not(Box<Expr<R>>),
    Filter(Rc<dyn Fn(&R) -> bool>),
    /// slot-id equality through the `_index` pseudo-attribute
    IndexIs(Datum),
    /// an attribute proxy that never got a comparison applied
    Incomplete(Box<str>),
}

impl<R> Clone for Expr<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Eq(attr, value) => Self::Eq(attr.clone(), value.clone()),
            Self::Cmp(attr, op, value) => Self::Cmp(attr.clone(), *op, value.clone()),
            Self::And(a, b) => Self::And(a.clone(), b.clone()),
            Self::Or(a, b) => Self::Or(a.clone(), b.clone()),
            Self::Not(a) => Self::Not(a.clone()),
            Self::Filter(f) => Self::Filter(f.clone()),
            Self::IndexIs(value) => Self::IndexIs(value.clone()),
            Self::Incomplete(attr) => Self::Incomplete(attr.clone()),
        }
    }
}

impl<R> fmt::Debug for Expr<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq(attr, value) => write!(f, "({attr} == {value:?})"),
            Self::Cmp(attr, op, value) => write!(f, "({attr} {} {value:?})", op.symbol()),
            Self::And(a, b) => write!(f, "({a:?} & {b:?})"),
            Self::Or(a, b) => write!(f, "({a:?} | {b:?})"),
            Self::Not(a) => write!(f, "!{a:?}"),
            Self::Filter(_) => write!(f, "<filter>"),
            Self::IndexIs(value) => write!(f, "({INDEX_ATTR} == {value:?})"),
            Self::Incomplete(attr) => write!(f, "<incomplete proxy `{attr}`>"),
        }
    }
}

/// Where a query came from. Handle-built queries carry the issuing table
/// and its schema epoch; combining operands keeps the older epoch, so one
/// stale part makes the whole query stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// built from plain values; always fresh
    Free,
    /// built by a handle of (table, epoch)
    Bound(HandleStamp),
    /// operands mixed handles of two different tables
    Foreign,
}

impl Origin {
    fn merge(self, other: Origin) -> Origin {
        match (self, other) {
            (Self::Free, origin) | (origin, Self::Free) => origin,
            (Self::Bound(a), Self::Bound(b)) if a.table == b.table => Self::Bound(HandleStamp {
                table: a.table,
                epoch: a.epoch.min(b.epoch),
            }),
            _ => Self::Foreign,
        }
    }
}

/// A built query. Obtained from [`QueryHandle`](crate::QueryHandle)
/// proxies and composed with `&`, `|` and `!`; every query method also
/// accepts the simpler input forms through [`IntoQuery`].
pub struct Query<R> {
    pub(crate) expr: Expr<R>,
    pub(crate) origin: Origin,
}

impl<R> Query<R> {
    pub(crate) fn new(expr: Expr<R>, origin: Origin) -> Self {
        Self { expr, origin }
    }
}

impl<R> Clone for Query<R> {
    fn clone(&self) -> Self {
        Self { expr: self.expr.clone(), origin: self.origin }
    }
}

impl<R> fmt::Debug for Query<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.expr, f)
    }
}

impl<R> BitAnd for Query<R> {
    type Output = Query<R>;
    fn bitand(self, rhs: Query<R>) -> Query<R> {
        Query::new(
            Expr::And(Box::new(self.expr), Box::new(rhs.expr)),
            self.origin.merge(rhs.origin),
        )
    }
}

impl<R> BitOr for Query<R> {
    type Output = Query<R>;
    fn bitor(self, rhs: Query<R>) -> Query<R> {
        Query::new(
            Expr::Or(Box::new(self.expr), Box::new(rhs.expr)),
            self.origin.merge(rhs.origin),
        )
    }
}

impl<R> Not for Query<R> {
    type Output = Query<R>;
    fn not(self) -> Query<R> {
        Query::new(Expr::Not(Box::new(self.expr)), self.origin)
    }
}

/// The query input forms every query method accepts: a built [`Query`], an
/// array of attribute/value pairs, or a record reference (the mapping
/// form; in object mode this needs object indexing enabled).
pub trait IntoQuery<R: RecordData> {
    fn into_query(self, table: &Table<R>) -> TableResult<Query<R>>;
}

impl<R: RecordData> IntoQuery<R> for Query<R> {
    fn into_query(self, _: &Table<R>) -> TableResult<Query<R>> {
        Ok(self)
    }
}

impl<R: RecordData> IntoQuery<R> for &Query<R> {
    fn into_query(self, _: &Table<R>) -> TableResult<Query<R>> {
        Ok(self.clone())
    }
}

impl<R: RecordData> IntoQuery<R> for &R {
    fn into_query(self, table: &Table<R>) -> TableResult<Query<R>> {
        if !table.accepts_record_queries() {
            return util::cold_rerr(TableError::BadQuery(
                "records are not queryable unless object indexing is enabled",
            ));
        }
        pairs_query(self.attr_names().into_iter().map(|attr| {
            let value = self.read_attr(&attr).unwrap_or(Datum::Null);
            (attr, value)
        }))
    }
}

impl<R: RecordData, K: Into<Box<str>>, V: Into<Datum>, const N: usize> IntoQuery<R>
    for [(K, V); N]
{
    fn into_query(self, _: &Table<R>) -> TableResult<Query<R>> {
        pairs_query(self.into_iter().map(|(attr, value)| (attr.into(), value.into())))
    }
}

/// The implicit conjunction of equality terms behind the mapping form.
fn pairs_query<R: RecordData>(
    pairs: impl Iterator<Item = (Box<str>, Datum)>,
) -> TableResult<Query<R>> {
    let mut expr: Option<Expr<R>> = None;
    for (attr, value) in pairs {
        let node = if attr.as_ref() == INDEX_ATTR {
            Expr::IndexIs(value)
        } else {
            Expr::Eq(attr, value)
        };
        expr = Some(match expr {
            Some(acc) => Expr::And(Box::new(acc), Box::new(node)),
            None => node,
        });
    }
    match expr {
        Some(expr) => Ok(Query::new(expr, Origin::Free)),
        None => util::cold_rerr(TableError::BadQuery("the query names no attributes")),
    }
}

/// Check the query's origin against the table, then evaluate it to the
/// matching slot set.
pub(crate) fn resolve<R: RecordData>(table: &Table<R>, query: &Query<R>) -> TableResult<SlotSet> {
    match query.origin {
        Origin::Free => {}
        Origin::Bound(stamp) => {
            if stamp.table != table.id() {
                return util::cold_rerr(TableError::BadQuery(
                    "the query was built by a handle of a different table",
                ));
            }
            if stamp.epoch != table.epoch() {
                return util::cold_rerr(TableError::StaleHandle);
            }
        }
        Origin::Foreign => {
            return util::cold_rerr(TableError::BadQuery(
                "the query mixes handles of two different tables",
            ))
        }
    }
    eval(table, &query.expr)
}

fn eval<R: RecordData>(table: &Table<R>, expr: &Expr<R>) -> TableResult<SlotSet> {
    match expr {
        // an empty table answers every comparison with the empty set,
        // even for attributes it has never seen
        Expr::Eq(..) | Expr::Cmp(..) if table.store().is_empty() => Ok(SlotSet::new()),
        Expr::Eq(attr, value) => eval_eq(table, attr, value),
        Expr::Cmp(attr, CmpOp::Ne, value) => {
            let eq = eval_eq(table, attr, value)?;
            Ok(table.store().universe().difference(&eq))
        }
        Expr::Cmp(attr, op, value) if attr.as_ref() == INDEX_ATTR => {
            eval_index_cmp(table, *op, value)
        }
        Expr::Cmp(attr, op, value) => table.index().lookup_cmp(attr, *op, value),
        Expr::And(a, b) => {
            let left = eval(table, a)?;
            if left.is_empty() {
                // the intersection is already decided
                return Ok(left);
            }
            Ok(left.intersect(&eval(table, b)?))
        }
        Expr::Or(a, b) => Ok(eval(table, a)?.union(&eval(table, b)?)),
        Expr::Not(a) => Ok(table.store().universe().difference(&eval(table, a)?)),
        Expr::Filter(accept) => Ok(table
            .store()
            .iter_live()
            .filter(|&(_, record)| accept(record))
            .map(|(slot, _)| slot)
            .collect()),
        Expr::IndexIs(value) => eval_index_eq(table, value),
        Expr::Incomplete(_) => Ok(SlotSet::new()),
    }
}

fn eval_eq<R: RecordData>(table: &Table<R>, attr: &str, value: &Datum) -> TableResult<SlotSet> {
    if attr == INDEX_ATTR {
        eval_index_eq(table, value)
    } else {
        table.index().lookup_eq(attr, value)
    }
}

/// `_index == value`: each normalized key selects at most the one live
/// slot it names; multi-key values intersect, so a two-id sequence can
/// never match.
fn eval_index_eq<R: RecordData>(table: &Table<R>, value: &Datum) -> TableResult<SlotSet> {
    let mut result: Option<SlotSet> = None;
    for k in key::normalize(value)? {
        let hit = match k {
            IndexKey::Int(slot) if slot >= 0 && table.store().is_live(slot as usize) => {
                SlotSet::singleton(slot as usize)
            }
            _ => SlotSet::new(),
        };
        result = Some(match result {
            Some(acc) => acc.intersect(&hit),
            None => hit,
        });
    }
    Ok(result.unwrap_or_default())
}

/// Inequality against `_index` compares live slot ids numerically.
fn eval_index_cmp<R: RecordData>(
    table: &Table<R>,
    op: CmpOp,
    probe: &Datum,
) -> TableResult<SlotSet> {
    Ok(table
        .store()
        .iter_live()
        .map(|(slot, _)| slot)
        .filter(|slot| {
            key::key_probe_cmp(&IndexKey::Int(*slot as i64), probe)
                .is_some_and(|ord| op.admits(ord))
        })
        .collect())
}
