/*
 * Created on Sat Apr 04 2026
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

//! Homegrown index primitives: the slot-set behind every posting list and
//! query result, and the hasher for the index maps.

mod hash;

pub use hash::{FxBuildHasher, FxHashMap, FxHashSet, FxHasher64};

use std::collections::{btree_set, BTreeSet};

/// Stable identity of a record within a table's lifetime: its position in
/// the record store. Never reused, even after removal.
pub type SlotId = usize;

/// A set of slot ids with an inline fast path for the overwhelmingly
/// common singleton posting. `Many` is kept at two or more elements; the
/// tree representation makes iteration ascending, which is what gives
/// query results their slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotSet {
    #[default]
    Empty,
    One(SlotId),
    Many(BTreeSet<SlotId>),
}

impl SlotSet {
    pub fn new() -> Self {
        Self::Empty
    }
    pub fn singleton(slot: SlotId) -> Self {
        Self::One(slot)
    }
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Many(set) => set.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
    pub fn contains(&self, slot: SlotId) -> bool {
        match self {
            Self::Empty => false,
            Self::One(s) => *s == slot,
            Self::Many(set) => set.contains(&slot),
        }
    }
    /// The smallest slot id in the set.
    pub fn first(&self) -> Option<SlotId> {
        match self {
            Self::Empty => None,
            Self::One(s) => Some(*s),
            Self::Many(set) => set.iter().next().copied(),
        }
    }
    pub fn insert(&mut self, slot: SlotId) -> bool {
        match self {
            Self::Empty => {
                *self = Self::One(slot);
                true
            }
            Self::One(s) if *s == slot => false,
            Self::One(s) => {
                let mut set = BTreeSet::new();
                set.insert(*s);
                set.insert(slot);
                *self = Self::Many(set);
                true
            }
            Self::Many(set) => set.insert(slot),
        }
    }
    pub fn remove(&mut self, slot: SlotId) -> bool {
        match self {
            Self::Empty => false,
            Self::One(s) if *s == slot => {
                *self = Self::Empty;
                true
            }
            Self::One(_) => false,
            Self::Many(set) => {
                let hit = set.remove(&slot);
                if set.len() == 1 {
                    if let Some(last) = set.iter().next().copied() {
                        *self = Self::One(last);
                    }
                }
                hit
            }
        }
    }
    pub fn iter(&self) -> Iter<'_> {
        match self {
            Self::Empty => Iter::Empty,
            Self::One(s) => Iter::One(Some(*s)),
            Self::Many(set) => Iter::Many(set.iter()),
        }
    }
    pub fn intersect(&self, other: &SlotSet) -> SlotSet {
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        small.iter().filter(|slot| large.contains(*slot)).collect()
    }
    pub fn union(&self, other: &SlotSet) -> SlotSet {
        self.iter().chain(other.iter()).collect()
    }
    /// `self \ other`
    pub fn difference(&self, other: &SlotSet) -> SlotSet {
        self.iter().filter(|slot| !other.contains(*slot)).collect()
    }
}

impl FromIterator<SlotId> for SlotSet {
    fn from_iter<I: IntoIterator<Item = SlotId>>(iter: I) -> Self {
        let mut set = Self::Empty;
        for slot in iter {
            set.insert(slot);
        }
        set
    }
}

pub enum Iter<'a> {
    Empty,
    One(Option<SlotId>),
    Many(btree_set::Iter<'a, SlotId>),
}

impl Iterator for Iter<'_> {
    type Item = SlotId;
    fn next(&mut self) -> Option<SlotId> {
        match self {
            Self::Empty => None,
            Self::One(slot) => slot.take(),
            Self::Many(it) => it.next().copied(),
        }
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Empty => (0, Some(0)),
            Self::One(slot) => {
                let n = slot.is_some() as usize;
                (n, Some(n))
            }
            Self::Many(it) => it.size_hint(),
        }
    }
}

pub enum IntoIter {
    Empty,
    One(Option<SlotId>),
    Many(btree_set::IntoIter<SlotId>),
}

impl Iterator for IntoIter {
    type Item = SlotId;
    fn next(&mut self) -> Option<SlotId> {
        match self {
            Self::Empty => None,
            Self::One(slot) => slot.take(),
            Self::Many(it) => it.next(),
        }
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Empty => (0, Some(0)),
            Self::One(slot) => {
                let n = slot.is_some() as usize;
                (n, Some(n))
            }
            Self::Many(it) => it.size_hint(),
        }
    }
}

impl IntoIterator for SlotSet {
    type Item = SlotId;
    type IntoIter = IntoIter;
    fn into_iter(self) -> IntoIter {
        match self {
            Self::Empty => IntoIter::Empty,
            Self::One(s) => IntoIter::One(Some(s)),
            Self::Many(set) => IntoIter::Many(set.into_iter()),
        }
    }
}

impl<'a> IntoIterator for &'a SlotSet {
    type Item = SlotId;
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
