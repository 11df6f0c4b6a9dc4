/*
 * Created on Sun Apr 12 2026
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
            error::{TableError, TableResult},
            idx::{SlotId, SlotSet},
        },
        util,
    },
    std::fmt,
};

enum Slot<R> {
    Live(R),
    Tombstone,
}

/// The record store: a growable array of slots. A slot's position is the
/// record's identity for the table's lifetime; removal tombstones the slot
/// in place so every later id stays stable.
pub struct RecordStore<R> {
    slots: Vec<Slot<R>>,
    live: usize,
}

impl<R> RecordStore<R> {
    pub fn new() -> Self {
        Self { slots: Vec::new(), live: 0 }
    }
    pub fn append(&mut self, record: R) -> SlotId {
        let slot = self.slots.len();
        self.slots.push(Slot::Live(record));
        self.live += 1;
        slot
    }
    pub fn get(&self, slot: SlotId) -> TableResult<&R> {
        match self.slots.get(slot) {
            Some(Slot::Live(record)) => Ok(record),
            Some(Slot::Tombstone) => util::cold_rerr(TableError::Deleted(slot)),
            None => util::cold_rerr(TableError::OutOfRange(slot)),
        }
    }
    pub fn get_mut(&mut self, slot: SlotId) -> TableResult<&mut R> {
        match self.slots.get_mut(slot) {
            Some(Slot::Live(record)) => Ok(record),
            Some(Slot::Tombstone) => util::cold_rerr(TableError::Deleted(slot)),
            None => util::cold_rerr(TableError::OutOfRange(slot)),
        }
    }
    pub fn is_live(&self, slot: SlotId) -> bool {
        matches!(self.slots.get(slot), Some(Slot::Live(_)))
    }
    /// Kill a live slot. Tombstones are terminal: killing one again is an
    /// error, not a no-op.
    pub fn tombstone(&mut self, slot: SlotId) -> TableResult<()> {
        match self.slots.get_mut(slot) {
            Some(cell @ Slot::Live(_)) => {
                *cell = Slot::Tombstone;
                self.live -= 1;
                Ok(())
            }
            Some(Slot::Tombstone) => util::cold_rerr(TableError::Deleted(slot)),
            None => util::cold_rerr(TableError::OutOfRange(slot)),
        }
    }
    /// Live records only, ascending slot id.
    pub fn iter_live(&self) -> impl Iterator<Item = (SlotId, &R)> {
        self.slots.iter().enumerate().filter_map(|(slot, cell)| match cell {
            Slot::Live(record) => Some((slot, record)),
            Slot::Tombstone => None,
        })
    }
    /// The live universe: every slot id currently holding a record.
    pub fn universe(&self) -> SlotSet {
        self.iter_live().map(|(slot, _)| slot).collect()
    }
    pub fn len(&self) -> usize {
        self.live
    }
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl<R> Default for RecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for RecordStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("live", &self.live)
            .field("slots", &self.slots.len())
            .finish()
    }
}
