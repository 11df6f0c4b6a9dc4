/*
 * Created on Sun Apr 19 2026
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
            core::query::CmpOp,
            data::{
                key::{self, IndexKey},
                Datum,
            },
            error::{TableError, TableResult},
            idx::{FxHashMap, FxHashSet, SlotId, SlotSet},
        },
        util,
    },
    log::trace,
};

/// The inverted index: attribute → value key → slots posted under it.
/// A derived view of the record store, and the authority every equality
/// query answers from.
///
/// Posting entries emptied by removal are pruned, except under the
/// empty-sequence sentinel, which stays resident once created.
#[derive(Debug, Default)]
pub struct AttrIndex {
    map: FxHashMap<Box<str>, FxHashMap<IndexKey, SlotSet>>,
    excluded: FxHashSet<Box<str>>,
}

impl AttrIndex {
    pub fn new(excluded: impl IntoIterator<Item = Box<str>>) -> Self {
        Self {
            map: FxHashMap::default(),
            excluded: excluded.into_iter().collect(),
        }
    }
    pub fn is_indexed(&self, attr: &str) -> bool {
        self.map.contains_key(attr)
    }
    pub fn is_excluded(&self, attr: &str) -> bool {
        self.excluded.contains(attr)
    }
    /// Indexed attribute names, sorted.
    pub fn attribute_names(&self) -> Vec<Box<str>> {
        let mut names: Vec<Box<str>> = self.map.keys().cloned().collect();
        names.sort_unstable();
        names
    }
    /// Make `attr` indexable. `Ok(true)` when the attribute is new.
    pub fn ensure_attr(&mut self, attr: &str) -> TableResult<bool> {
        if self.is_excluded(attr) {
            return util::cold_rerr(TableError::ExcludedAttribute(attr.into()));
        }
        if self.map.contains_key(attr) {
            return Ok(false);
        }
        self.map.insert(attr.into(), FxHashMap::default());
        Ok(true)
    }
    pub fn clear_attr(&mut self, attr: &str) {
        if let Some(postings) = self.map.get_mut(attr) {
            postings.clear();
        }
    }
    /// Post `slot` under every key `value` normalizes to.
    pub fn post(&mut self, attr: &str, slot: SlotId, value: &Datum) -> TableResult<()> {
        let keys = key::normalize(value)?;
        let Some(postings) = self.map.get_mut(attr) else {
            return util::cold_rerr(TableError::UnknownAttribute(attr.into()));
        };
        for k in keys {
            postings.entry(k).or_default().insert(slot);
        }
        trace!("posted slot {slot} under `{attr}`");
        Ok(())
    }
    /// Withdraw `slot` from every key `value` normalizes to. A posting the
    /// index does not carry means the store changed behind its back.
    pub fn unpost(&mut self, attr: &str, slot: SlotId, value: &Datum) -> TableResult<()> {
        let keys = key::normalize(value)?;
        let Some(postings) = self.map.get_mut(attr) else {
            return util::cold_rerr(TableError::UnknownAttribute(attr.into()));
        };
        for k in keys {
            let hit = match postings.get_mut(&k) {
                Some(set) => set.remove(slot),
                None => false,
            };
            if !hit {
                return util::cold_rerr(TableError::StaleIndex(attr.into()));
            }
            if k != IndexKey::Empty && postings.get(&k).is_some_and(SlotSet::is_empty) {
                postings.remove(&k);
            }
        }
        trace!("withdrew slot {slot} from `{attr}`");
        Ok(())
    }
    /// Would [`Self::unpost`] succeed? Lets the mutation validators catch a
    /// stale index before any state changes.
    pub fn can_unpost(&self, attr: &str, slot: SlotId, value: &Datum) -> TableResult<bool> {
        let keys = key::normalize(value)?;
        let Some(postings) = self.map.get(attr) else {
            return Ok(false);
        };
        Ok(keys.iter().all(|k| postings.get(k).is_some_and(|set| set.contains(slot))))
    }
    pub fn repost(
        &mut self,
        attr: &str,
        slot: SlotId,
        old: &Datum,
        new: &Datum,
    ) -> TableResult<()> {
        self.unpost(attr, slot, old)?;
        self.post(attr, slot, new)
    }
    /// Slots equal to `value` under `attr`. A multi-key value intersects
    /// the per-element posting lists: "carries all of these elements".
    pub fn lookup_eq(&self, attr: &str, value: &Datum) -> TableResult<SlotSet> {
        let Some(postings) = self.map.get(attr) else {
            return util::cold_rerr(TableError::UnknownAttribute(attr.into()));
        };
        let mut result: Option<SlotSet> = None;
        for k in key::normalize(value)? {
            let hits = postings.get(&k).cloned().unwrap_or_default();
            result = Some(match result {
                Some(acc) => acc.intersect(&hits),
                None => hits,
            });
            if result.as_ref().is_some_and(SlotSet::is_empty) {
                break;
            }
        }
        Ok(result.unwrap_or_default())
    }
    /// Slots whose keys under `attr` satisfy `op` against `probe`. Keys
    /// not comparable with the probe are skipped. `!=` never reaches the
    /// index; the algebra resolves it against the live universe.
    pub fn lookup_cmp(&self, attr: &str, op: CmpOp, probe: &Datum) -> TableResult<SlotSet> {
        debug_assert!(op != CmpOp::Ne, "`!=` resolves through the equality set");
        let Some(postings) = self.map.get(attr) else {
            return util::cold_rerr(TableError::UnknownAttribute(attr.into()));
        };
        let mut result = SlotSet::new();
        for (k, set) in postings {
            if key::key_probe_cmp(k, probe).is_some_and(|ord| op.admits(ord)) {
                result = result.union(set);
            }
        }
        Ok(result)
    }
    #[cfg(test)]
    pub fn posting(&self, attr: &str, k: &IndexKey) -> Option<&SlotSet> {
        self.map.get(attr)?.get(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AttrIndex {
        let mut index = AttrIndex::new(["secret".into()]);
        index.ensure_attr("role").unwrap();
        index.post("role", 0, &Datum::from("guitar")).unwrap();
        index
            .post("role", 1, &Datum::from(vec![Datum::from("guitar"), Datum::from("strings")]))
            .unwrap();
        index
    }

    #[test]
    fn eq_intersects_multi_key_values() {
        let index = sample();
        assert_eq!(
            index.lookup_eq("role", &Datum::from("guitar")).unwrap(),
            [0, 1].into_iter().collect()
        );
        assert_eq!(
            index
                .lookup_eq(
                    "role",
                    &Datum::from(vec![Datum::from("guitar"), Datum::from("strings")])
                )
                .unwrap(),
            SlotSet::singleton(1)
        );
        assert_eq!(
            index.lookup_eq("born", &Datum::Int(0)),
            Err(TableError::UnknownAttribute("born".into()))
        );
    }

    #[test]
    fn unpost_prunes_except_empty_sentinel() {
        let mut index = sample();
        index.ensure_attr("tags").unwrap();
        index.post("tags", 0, &Datum::List(vec![])).unwrap();
        index.unpost("tags", 0, &Datum::List(vec![])).unwrap();
        // the sentinel entry stays, as an empty set
        assert_eq!(index.posting("tags", &IndexKey::Empty), Some(&SlotSet::new()));
        index.unpost("role", 0, &Datum::from("guitar")).unwrap();
        assert_eq!(index.posting("role", &IndexKey::Str("guitar".into())).unwrap().len(), 1);
        // a wrong value means the store was edited behind the index
        assert_eq!(
            index.unpost("role", 1, &Datum::from("drums")),
            Err(TableError::StaleIndex("role".into()))
        );
    }

    #[test]
    fn excluded_attributes_are_refused() {
        let mut index = sample();
        assert_eq!(
            index.ensure_attr("secret"),
            Err(TableError::ExcludedAttribute("secret".into()))
        );
    }
}
