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

use {
    super::fill_value,
    crate::{
        engine::{
            core::table::{AttrDefault, Table},
            data::{key, RecordData},
            error::{TableError, TableResult},
            idx::SlotId,
        },
        util,
    },
    log::debug,
};

/// Store one record. Validation first: the record's own values must
/// normalize, every indexed attribute it lacks must be defaultable, and
/// any attribute it introduces must be back-fillable over the older slots.
/// Only then does anything commit.
pub(crate) fn add<R: RecordData>(table: &mut Table<R>, record: R) -> TableResult<SlotId> {
    let known = table.index().attribute_names();
    let rec_attrs = record.attr_names();
    // the attributes this record introduces, where the mode permits that
    let mut fresh: Vec<Box<str>> = Vec::new();
    if table.auto_adds_attributes() {
        for attr in &rec_attrs {
            if !table.index().is_indexed(attr) && !table.index().is_excluded(attr) {
                fresh.push(attr.clone());
            }
        }
    }
    for attr in &rec_attrs {
        if !table.index().is_indexed(attr) && !fresh.iter().any(|f| f == attr) {
            // excluded, outside the allow-list, or object mode without
            // object indexing: stored, never indexed
            continue;
        }
        if let Some(value) = record.read_attr(attr) {
            key::normalize(&value)?;
        }
    }
    for attr in &known {
        if record.read_attr(attr).is_none() && !table.has_default() {
            return util::cold_rerr(TableError::MissingAttribute(attr.clone()));
        }
    }
    for attr in &fresh {
        for (_, older) in table.store().iter_live() {
            match older.read_attr(attr) {
                Some(value) => {
                    key::normalize(&value)?;
                }
                None if table.has_default() => {}
                None => return util::cold_rerr(TableError::MissingAttribute(attr.clone())),
            }
        }
    }
    // commit
    let slot = table.store_mut().append(record);
    for attr in &fresh {
        introduce_attr(table, attr)?;
    }
    for attr in &known {
        let mut default = table.take_default();
        let value = fill_value(table.store_mut(), slot, attr, &mut default);
        table.put_default(default);
        table.index_mut().post(attr, slot, &value?)?;
    }
    if !fresh.is_empty() {
        table.bump_epoch();
    }
    debug!("table {}: added record at slot {slot} ({} new attribute(s))", table.id(), fresh.len());
    Ok(slot)
}

pub(crate) fn extend<R: RecordData>(
    table: &mut Table<R>,
    records: impl IntoIterator<Item = R>,
) -> TableResult<usize> {
    let mut n = 0;
    for record in records {
        add(table, record)?;
        n += 1;
    }
    Ok(n)
}

/// Index an attribute the table just met, back-filling with the table
/// default. Validation is the caller's business; epochs too.
pub(super) fn introduce_attr<R: RecordData>(table: &mut Table<R>, attr: &str) -> TableResult<()> {
    let mut default = table.take_default();
    let outcome = backfill(table, attr, &mut default);
    table.put_default(default);
    outcome
}

/// Eagerly index `attr` over every live record, filling the gaps from
/// `default` alone. Explicit additions never fall back to the table-wide
/// default. Bumps the schema epoch; already-indexed attributes are left
/// alone.
pub(crate) fn add_attribute<R: RecordData>(
    table: &mut Table<R>,
    attr: &str,
    mut default: Option<AttrDefault>,
) -> TableResult<()> {
    if table.index().is_excluded(attr) {
        return util::cold_rerr(TableError::ExcludedAttribute(attr.into()));
    }
    if table.index().is_indexed(attr) {
        return Ok(());
    }
    backfill(table, attr, &mut default)?;
    table.bump_epoch();
    debug!("table {}: added attribute `{attr}` over {} live slot(s)", table.id(), table.len());
    Ok(())
}

fn backfill<R: RecordData>(
    table: &mut Table<R>,
    attr: &str,
    default: &mut Option<AttrDefault>,
) -> TableResult<()> {
    // validate before the index learns the attribute
    for (_, record) in table.store().iter_live() {
        match record.read_attr(attr) {
            Some(value) => {
                key::normalize(&value)?;
            }
            None if default.is_some() => {}
            None => return util::cold_rerr(TableError::MissingAttribute(attr.into())),
        }
    }
    table.index_mut().ensure_attr(attr)?;
    repost_all(table, attr, default)
}

/// Rebuild every attribute's postings from the records as they are now.
pub(crate) fn reindex_all<R: RecordData>(table: &mut Table<R>) -> TableResult<()> {
    for attr in table.index().attribute_names() {
        rebuild(table, &attr)?;
    }
    table.bump_epoch();
    debug!("table {}: reindexed over {} live slot(s)", table.id(), table.len());
    Ok(())
}

pub(crate) fn reindex_attr<R: RecordData>(table: &mut Table<R>, attr: &str) -> TableResult<()> {
    if table.index().is_excluded(attr) {
        return util::cold_rerr(TableError::ExcludedAttribute(attr.into()));
    }
    if !table.index().is_indexed(attr) {
        return util::cold_rerr(TableError::UnknownAttribute(attr.into()));
    }
    rebuild(table, attr)?;
    table.bump_epoch();
    debug!("table {}: reindexed `{attr}`", table.id());
    Ok(())
}

fn rebuild<R: RecordData>(table: &mut Table<R>, attr: &str) -> TableResult<()> {
    let mut gaps = false;
    for (_, record) in table.store().iter_live() {
        match record.read_attr(attr) {
            Some(value) => {
                key::normalize(&value)?;
            }
            None => gaps = true,
        }
    }
    if gaps && !table.has_default() {
        return util::cold_rerr(TableError::MissingAttribute(attr.into()));
    }
    table.index_mut().clear_attr(attr);
    let mut default = table.take_default();
    let outcome = repost_all(table, attr, &mut default);
    table.put_default(default);
    outcome
}

fn repost_all<R: RecordData>(
    table: &mut Table<R>,
    attr: &str,
    default: &mut Option<AttrDefault>,
) -> TableResult<()> {
    for slot in 0..table.store().slot_count() {
        if !table.store().is_live(slot) {
            continue;
        }
        let value = fill_value(table.store_mut(), slot, attr, default)?;
        table.index_mut().post(attr, slot, &value)?;
    }
    Ok(())
}
