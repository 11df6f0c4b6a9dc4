/*
 * Created on Sun May 17 2026
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
                dml::{self, Records},
                handle::QueryHandle,
                index::AttrIndex,
                query::IntoQuery,
                store::RecordStore,
            },
            data::{AttrMap, Datum, RecordData},
            error::{TableError, TableResult},
            idx::SlotId,
        },
        util,
    },
    std::{fmt, marker::PhantomData},
};

/// Instance identity. Query handles carry it so a handle can never be
/// replayed against a table that did not issue it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId {
    id: uuid::Uuid,
}

impl TableId {
    fn new() -> Self {
        Self { id: uuid::Uuid::new_v4() }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// The value used for attributes a record does not carry: a constant, or
/// a generator invoked once per slot that needs one.
pub enum AttrDefault {
    Value(Datum),
    Generate(Box<dyn FnMut() -> Datum>),
}

impl AttrDefault {
    pub fn generate(f: impl FnMut() -> Datum + 'static) -> Self {
        Self::Generate(Box::new(f))
    }
    pub(crate) fn produce(&mut self) -> Datum {
        match self {
            Self::Value(v) => v.clone(),
            Self::Generate(f) => f(),
        }
    }
}

impl From<Datum> for AttrDefault {
    fn from(v: Datum) -> Self {
        Self::Value(v)
    }
}

impl fmt::Debug for AttrDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Generate(_) => f.write_str("Generate(..)"),
        }
    }
}

/// How records expose their attributes. Fixed at construction; the record
/// type parameter is in practice the mode, but the flag decides the
/// behaviors that differ (attribute auto-add, records as queries).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordMode {
    Mapping,
    Object,
}

/// An in-memory, schemaless table of records with an inverted index over
/// every indexed attribute. See the crate docs for the model.
pub struct Table<R: RecordData = AttrMap> {
    id: TableId,
    store: RecordStore<R>,
    index: AttrIndex,
    epoch: u64,
    mode: RecordMode,
    auto_attrs: bool,
    index_objects: bool,
    always_list: bool,
    default_attr: Option<AttrDefault>,
}

impl Table<AttrMap> {
    /// An empty mapping-mode table that auto-indexes every attribute it
    /// sees.
    pub fn new() -> Self {
        Self {
            id: TableId::new(),
            store: RecordStore::new(),
            index: AttrIndex::new([]),
            epoch: 0,
            mode: RecordMode::Mapping,
            auto_attrs: true,
            index_objects: false,
            always_list: false,
            default_attr: None,
        }
    }
}

impl Default for Table<AttrMap> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RecordData> Table<R> {
    pub fn builder() -> TableBuilder<R> {
        TableBuilder::new()
    }

    // identity and shape
    pub fn id(&self) -> TableId {
        self.id
    }
    /// Count of live records.
    pub fn len(&self) -> usize {
        self.store.len()
    }
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
    /// Count of slots ever allocated, tombstones included.
    pub fn slot_count(&self) -> usize {
        self.store.slot_count()
    }
    /// Indexed attribute names, sorted.
    pub fn attributes(&self) -> Vec<Box<str>> {
        self.index.attribute_names()
    }
    pub fn mode(&self) -> RecordMode {
        self.mode
    }
    pub fn is_indexed(&self, attr: &str) -> bool {
        self.index.is_indexed(attr)
    }
    pub fn is_excluded(&self, attr: &str) -> bool {
        self.index.is_excluded(attr)
    }

    // options
    pub fn always_return_list(&self) -> bool {
        self.always_list
    }
    /// Toggle eager materialization of [`Table::query`] results.
    pub fn set_always_return_list(&mut self, yes: bool) {
        self.always_list = yes;
    }
    /// Toggle object indexing: whether added records introduce their own
    /// attributes and whether records can be used as queries.
    pub fn set_index_objects(&mut self, yes: bool) {
        self.index_objects = yes;
    }

    // mutation
    /// Store a record, posting every indexed attribute; attributes the
    /// table has not seen before are auto-added (back-filling older slots
    /// through the default rule) where the mode permits. Validates fully
    /// before touching any state.
    pub fn add(&mut self, record: R) -> TableResult<SlotId> {
        dml::add(self, record)
    }
    /// [`Table::add`] for every record, in order. Stops at the first
    /// failure; prior records stay.
    pub fn extend(&mut self, records: impl IntoIterator<Item = R>) -> TableResult<usize> {
        dml::extend(self, records)
    }
    /// Index `attr` eagerly over every live record, which must all carry
    /// it. Bumps the schema epoch.
    pub fn add_attribute(&mut self, attr: &str) -> TableResult<()> {
        dml::add_attribute(self, attr, None)
    }
    /// Like [`Table::add_attribute`], with a constant for the records
    /// lacking the attribute. The value is written into those records.
    pub fn add_attribute_with(&mut self, attr: &str, default: impl Into<Datum>) -> TableResult<()> {
        dml::add_attribute(self, attr, Some(AttrDefault::Value(default.into())))
    }
    /// Like [`Table::add_attribute_with`], with a generator invoked once
    /// per record lacking the attribute, in ascending slot order.
    pub fn add_attribute_using(
        &mut self,
        attr: &str,
        default: impl FnMut() -> Datum + 'static,
    ) -> TableResult<()> {
        dml::add_attribute(self, attr, Some(AttrDefault::generate(default)))
    }
    /// Tombstone every record the query selects. Zero matches is an
    /// error, not a no-op.
    pub fn remove(&mut self, query: impl IntoQuery<R>) -> TableResult<usize> {
        dml::remove(self, query)
    }
    /// Write `changes` into every selected record, reposting each touched
    /// attribute. Atomic per call: validation failures leave the table
    /// untouched.
    pub fn update(&mut self, changes: &AttrMap, query: impl IntoQuery<R>) -> TableResult<usize> {
        dml::update(self, changes, query)
    }
    /// [`Table::update`] with the changes read off a record: every
    /// attribute `changes` carries is copied onto the selected records.
    pub fn update_from(&mut self, changes: &R, query: impl IntoQuery<R>) -> TableResult<usize> {
        dml::update_from(self, changes, query)
    }
    /// Rebuild every attribute's postings from the records as they are
    /// now. Bumps the schema epoch; outstanding handles go stale.
    pub fn reindex(&mut self) -> TableResult<()> {
        dml::reindex_all(self)
    }
    /// Rebuild one attribute's postings.
    pub fn reindex_attr(&mut self, attr: &str) -> TableResult<()> {
        dml::reindex_attr(self, attr)
    }

    // queries
    /// The records the query selects, ascending slot order. Lazy unless
    /// `always_return_list` is set; same records either way.
    pub fn query(&self, query: impl IntoQuery<R>) -> TableResult<Records<'_, R>> {
        dml::query(self, query)
    }
    /// The selected record with the lowest slot id, if any.
    pub fn query_one(&self, query: impl IntoQuery<R>) -> TableResult<Option<&R>> {
        dml::query_one(self, query)
    }
    pub fn count(&self, query: impl IntoQuery<R>) -> TableResult<usize> {
        dml::count(self, query)
    }
    pub fn contains(&self, query: impl IntoQuery<R>) -> TableResult<bool> {
        dml::contains(self, query)
    }
    /// A fresh handle at the current schema epoch.
    pub fn handle(&self) -> QueryHandle<R> {
        QueryHandle::new(self)
    }

    // slot access
    /// The live record at `slot`.
    pub fn get(&self, slot: SlotId) -> TableResult<&R> {
        self.store.get(slot)
    }
    /// Mutable access to the live record at `slot`. Edits made this way
    /// bypass the index: queries answer from the old postings until
    /// [`Table::reindex`] runs.
    pub fn get_mut(&mut self, slot: SlotId) -> TableResult<&mut R> {
        self.store.get_mut(slot)
    }
    /// Live records, ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.store.iter_live().map(|(_, record)| record)
    }
    /// Live `(slot, record)` pairs, ascending slot order.
    pub fn entries(&self) -> impl Iterator<Item = (SlotId, &R)> {
        self.store.iter_live()
    }

    // crate-internal plumbing
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }
    pub(crate) fn bump_epoch(&mut self) {
        self.epoch += 1;
    }
    pub(crate) fn store(&self) -> &RecordStore<R> {
        &self.store
    }
    pub(crate) fn store_mut(&mut self) -> &mut RecordStore<R> {
        &mut self.store
    }
    pub(crate) fn index(&self) -> &AttrIndex {
        &self.index
    }
    pub(crate) fn index_mut(&mut self) -> &mut AttrIndex {
        &mut self.index
    }
    pub(crate) fn auto_adds_attributes(&self) -> bool {
        self.auto_attrs && (self.mode == RecordMode::Mapping || self.index_objects)
    }
    pub(crate) fn accepts_record_queries(&self) -> bool {
        self.mode == RecordMode::Mapping || self.index_objects
    }
    pub(crate) fn has_default(&self) -> bool {
        self.default_attr.is_some()
    }
    pub(crate) fn take_default(&mut self) -> Option<AttrDefault> {
        self.default_attr.take()
    }
    pub(crate) fn put_default(&mut self, default: Option<AttrDefault>) {
        self.default_attr = default;
    }
}

impl<R: RecordData> fmt::Debug for Table<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("live", &self.len())
            .field("slots", &self.slot_count())
            .field("attributes", &self.attributes())
            .field("epoch", &self.epoch)
            .field("mode", &self.mode)
            .finish()
    }
}

/// Construction options for a [`Table`].
pub struct TableBuilder<R: RecordData = AttrMap> {
    attributes: Option<Vec<Box<str>>>,
    excluded: Vec<Box<str>>,
    default_attr: Option<AttrDefault>,
    mode: RecordMode,
    index_objects: bool,
    always_list: bool,
    _record: PhantomData<fn() -> R>,
}

impl<R: RecordData> TableBuilder<R> {
    fn new() -> Self {
        Self {
            attributes: None,
            excluded: Vec::new(),
            default_attr: None,
            mode: RecordMode::Mapping,
            index_objects: false,
            always_list: false,
            _record: PhantomData,
        }
    }
    /// Index exactly these attributes. Attributes outside the list are
    /// ignored on every record, never auto-added.
    pub fn attributes<S: Into<Box<str>>>(mut self, attrs: impl IntoIterator<Item = S>) -> Self {
        self.attributes = Some(attrs.into_iter().map(Into::into).collect());
        self
    }
    /// Forbid these attributes from ever being indexed.
    pub fn exclude<S: Into<Box<str>>>(mut self, attrs: impl IntoIterator<Item = S>) -> Self {
        self.excluded.extend(attrs.into_iter().map(Into::into));
        self
    }
    /// The constant supplied for attributes missing on a record.
    pub fn default_value(mut self, value: impl Into<Datum>) -> Self {
        self.default_attr = Some(AttrDefault::Value(value.into()));
        self
    }
    /// A generator supplying values for attributes missing on a record,
    /// invoked once per slot that needs one.
    pub fn default_with(mut self, f: impl FnMut() -> Datum + 'static) -> Self {
        self.default_attr = Some(AttrDefault::generate(f));
        self
    }
    /// Records are opaque host objects rather than mappings.
    pub fn object_mode(mut self) -> Self {
        self.mode = RecordMode::Object;
        self
    }
    /// Object mode: auto-add record attributes on add and allow records
    /// as queries.
    pub fn index_objects(mut self, yes: bool) -> Self {
        self.index_objects = yes;
        self
    }
    /// Materialize `query` results eagerly.
    pub fn always_return_list(mut self, yes: bool) -> Self {
        self.always_list = yes;
        self
    }
    /// Build the empty table. Fails if the allow-list and the exclusion
    /// list overlap.
    pub fn build(self) -> TableResult<Table<R>> {
        if let Some(attrs) = &self.attributes {
            if let Some(bad) = attrs.iter().find(|a| self.excluded.iter().any(|e| e == *a)) {
                return util::cold_rerr(TableError::ExcludedAttribute(bad.clone()));
            }
        }
        let mut index = AttrIndex::new(self.excluded);
        let auto_attrs = self.attributes.is_none();
        if let Some(attrs) = self.attributes {
            for attr in attrs {
                index.ensure_attr(&attr)?;
            }
        }
        Ok(Table {
            id: TableId::new(),
            store: RecordStore::new(),
            index,
            epoch: 0,
            mode: self.mode,
            auto_attrs,
            index_objects: self.index_objects,
            always_list: self.always_list,
            default_attr: self.default_attr,
        })
    }
    /// Build and load the initial records, in order.
    pub fn build_with(self, records: impl IntoIterator<Item = R>) -> TableResult<Table<R>> {
        let mut table = self.build()?;
        table.extend(records)?;
        Ok(table)
    }
}
