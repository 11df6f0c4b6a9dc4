/*
 * Created on Sat Mar 21 2026
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
    crate::engine::{data::datum::Datum, idx::FxHashMap},
    serde::{
        de::{MapAccess, Visitor},
        ser::SerializeMap,
        Deserialize, Deserializer, Serialize, Serializer,
    },
    std::fmt,
};

/// The attribute access protocol every record type speaks. Mapping-mode
/// tables use [`AttrMap`]; object mode is any host type implementing this
/// trait over its own fields.
///
/// The table writes through `write_attr` when it back-fills defaults, so
/// an implementation that silently drops unknown attributes must not be
/// used with auto-indexing enabled.
pub trait RecordData {
    /// Read an attribute; `None` when the record does not carry it.
    fn read_attr(&self, attr: &str) -> Option<Datum>;
    /// Write an attribute, overwriting any previous value.
    fn write_attr(&mut self, attr: &str, value: Datum);
    /// Every attribute this record carries, in a stable order.
    fn attr_names(&self) -> Vec<Box<str>>;
}

/// A schemaless record: attribute name → [`Datum`].
#[derive(Clone, Default, PartialEq)]
pub struct AttrMap {
    map: FxHashMap<Box<str>, Datum>,
}

impl AttrMap {
    pub fn new() -> Self {
        Self { map: FxHashMap::default() }
    }
    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
    pub fn get(&self, attr: &str) -> Option<&Datum> {
        self.map.get(attr)
    }
    pub fn set(&mut self, attr: impl Into<Box<str>>, value: impl Into<Datum>) {
        self.map.insert(attr.into(), value.into());
    }
    pub fn unset(&mut self, attr: &str) -> Option<Datum> {
        self.map.remove(attr)
    }
    pub fn has_attr(&self, attr: &str) -> bool {
        self.map.contains_key(attr)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Datum)> {
        self.map.iter().map(|(k, v)| (k.as_ref(), v))
    }
}

impl RecordData for AttrMap {
    fn read_attr(&self, attr: &str) -> Option<Datum> {
        self.map.get(attr).cloned()
    }
    fn write_attr(&mut self, attr: &str, value: Datum) {
        self.map.insert(attr.into(), value);
    }
    fn attr_names(&self) -> Vec<Box<str>> {
        let mut names: Vec<Box<str>> = self.map.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl<K: Into<Box<str>>, V: Into<Datum>> FromIterator<(K, V)> for AttrMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (attr, value) in iter {
            map.set(attr, value);
        }
        map
    }
}

impl<K: Into<Box<str>>, V: Into<Datum>, const N: usize> From<[(K, V); N]> for AttrMap {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl fmt::Debug for AttrMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(&str, &Datum)> = self.iter().collect();
        entries.sort_unstable_by_key(|(attr, _)| *attr);
        f.debug_map().entries(entries).finish()
    }
}

impl Serialize for AttrMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for attr in self.attr_names() {
            map.serialize_entry(&attr, &self.map[&attr])?;
        }
        map.end()
    }
}

struct AttrMapVisitor;

impl<'de> Visitor<'de> for AttrMapVisitor {
    type Value = AttrMap;
    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of attribute names to values")
    }
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<AttrMap, A::Error> {
        let mut map = AttrMap::new();
        while let Some((attr, value)) = access.next_entry::<Box<str>, Datum>()? {
            map.set(attr, value);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for AttrMap {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<AttrMap, D::Error> {
        d.deserialize_map(AttrMapVisitor)
    }
}

#[test]
fn literal_macro() {
    let rec = crate::attrmap! { "first" => "John", "born" => 1940 };
    assert_eq!(rec.get("first"), Some(&Datum::from("John")));
    assert_eq!(rec.get("born"), Some(&Datum::Int(1940)));
    assert_eq!(rec.attr_names(), vec![Box::<str>::from("born"), Box::<str>::from("first")]);
}

#[test]
fn serde_roundtrip() {
    let rec = crate::attrmap! {
        "first" => "John",
        "born" => 1940,
        "role" => vec![Datum::from("guitar"), Datum::from("strings")],
        "solo" => Datum::Null,
    };
    let json = serde_json::to_string(&rec).unwrap();
    let back: AttrMap = serde_json::from_str(&json).unwrap();
    assert_eq!(rec, back);
}
