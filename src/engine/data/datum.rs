/*
 * Created on Sun Mar 08 2026
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
    crate::engine::data::record::AttrMap,
    serde::{
        de::{self, MapAccess, SeqAccess, Visitor},
        ser::{Error as _, SerializeSeq},
        Deserialize, Deserializer, Serialize, Serializer,
    },
    std::{any::Any, fmt, rc::Rc},
};

#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum DatumKind {
    Null = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    Str = 4,
    List = 5,
    Map = 6,
    Opaque = 7,
}

/// A host payload the table indexes through equality and hash supplied by
/// the host itself. Implementations must keep `opaque_eq` reflexive and
/// consistent with `opaque_hash`.
pub trait OpaqueData: fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn opaque_eq(&self, other: &dyn OpaqueData) -> bool;
    fn opaque_hash(&self) -> u64;
}

/// An attribute value. `Map` is representable so that record-shaped values
/// can travel through serde, but mappings are not valid index values and
/// normalization rejects them.
#[derive(Clone)]
pub enum Datum {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Box<str>),
    List(Vec<Datum>),
    Map(AttrMap),
    Opaque(Rc<dyn OpaqueData>),
}

impl Datum {
    pub fn kind(&self) -> DatumKind {
        match self {
            Self::Null => DatumKind::Null,
            Self::Bool(_) => DatumKind::Bool,
            Self::Int(_) => DatumKind::Int,
            Self::Float(_) => DatumKind::Float,
            Self::Str(_) => DatumKind::Str,
            Self::List(_) => DatumKind::List,
            Self::Map(_) => DatumKind::Map,
            Self::Opaque(_) => DatumKind::Opaque,
        }
    }
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
    // bool
    pub fn try_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
    pub fn bool(&self) -> bool {
        self.try_bool().unwrap()
    }
    // int
    pub fn try_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
    pub fn int(&self) -> i64 {
        self.try_int().unwrap()
    }
    // float
    pub fn try_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }
    pub fn float(&self) -> f64 {
        self.try_float().unwrap()
    }
    // str
    pub fn try_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
    pub fn str(&self) -> &str {
        self.try_str().unwrap()
    }
    // list
    pub fn try_list(&self) -> Option<&[Datum]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }
    pub fn list(&self) -> &[Datum] {
        self.try_list().unwrap()
    }
    // map
    pub fn try_map(&self) -> Option<&AttrMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
    // opaque
    pub fn new_opaque(data: impl OpaqueData + 'static) -> Self {
        Self::Opaque(Rc::new(data))
    }
    pub fn try_opaque(&self) -> Option<&dyn OpaqueData> {
        match self {
            Self::Opaque(o) => Some(&**o),
            _ => None,
        }
    }
}

enum_impls! {
    Datum => {
        bool as Bool,
        i64 as Int,
        i32 as Int,
        u32 as Int,
        f64 as Float,
        f32 as Float,
        &str as Str,
        String as Str,
        Box<str> as Str,
        Vec<Datum> as List,
        AttrMap as Map,
    }
}

impl<const N: usize> From<[Datum; N]> for Datum {
    fn from(l: [Datum; N]) -> Self {
        Self::List(l.into())
    }
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Datum) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => a.opaque_eq(&**b),
            _ => false,
        }
    }
}

impl fmt::Debug for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b:?}"),
            Self::Int(i) => write!(f, "{i:?}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(l) => f.debug_list().entries(l).finish(),
            Self::Map(m) => write!(f, "{m:?}"),
            Self::Opaque(o) => write!(f, "opaque({o:?})"),
        }
    }
}

impl Serialize for Datum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Str(s) => serializer.serialize_str(s),
            Self::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for item in l {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(m) => m.serialize(serializer),
            Self::Opaque(_) => Err(S::Error::custom("an opaque value cannot be serialized")),
        }
    }
}

struct DatumVisitor;

impl<'de> Visitor<'de> for DatumVisitor {
    type Value = Datum;
    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a null, boolean, number, string, sequence or map")
    }
    fn visit_unit<E: de::Error>(self) -> Result<Datum, E> {
        Ok(Datum::Null)
    }
    fn visit_none<E: de::Error>(self) -> Result<Datum, E> {
        Ok(Datum::Null)
    }
    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Datum, D::Error> {
        d.deserialize_any(DatumVisitor)
    }
    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Datum, E> {
        Ok(Datum::Bool(v))
    }
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Datum, E> {
        Ok(Datum::Int(v))
    }
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Datum, E> {
        i64::try_from(v)
            .map(Datum::Int)
            .map_err(|_| E::custom("integer out of the representable range"))
    }
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Datum, E> {
        Ok(Datum::Float(v))
    }
    fn visit_str<E: de::Error>(self, v: &str) -> Result<Datum, E> {
        Ok(Datum::Str(v.into()))
    }
    fn visit_string<E: de::Error>(self, v: String) -> Result<Datum, E> {
        Ok(Datum::Str(v.into()))
    }
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Datum, A::Error> {
        let mut list = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            list.push(item);
        }
        Ok(Datum::List(list))
    }
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Datum, A::Error> {
        let mut map = AttrMap::new();
        while let Some((attr, value)) = access.next_entry::<Box<str>, Datum>()? {
            map.set(attr, value);
        }
        Ok(Datum::Map(map))
    }
}

impl<'de> Deserialize<'de> for Datum {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Datum, D::Error> {
        d.deserialize_any(DatumVisitor)
    }
}

#[test]
fn conversions() {
    assert_eq!(Datum::from(1940), Datum::Int(1940));
    assert_eq!(Datum::from("drums"), Datum::Str("drums".into()));
    assert_eq!(Datum::from(Some(3)), Datum::Int(3));
    assert_eq!(Datum::from(Option::<i64>::None), Datum::Null);
    assert_ne!(Datum::Int(1), Datum::Float(1.0));
}

#[test]
fn opaque_equality() {
    #[derive(Debug)]
    struct Token(u64);
    impl OpaqueData for Token {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn opaque_eq(&self, other: &dyn OpaqueData) -> bool {
            other.as_any().downcast_ref::<Token>().map_or(false, |o| o.0 == self.0)
        }
        fn opaque_hash(&self) -> u64 {
            self.0
        }
    }
    assert_eq!(Datum::new_opaque(Token(7)), Datum::new_opaque(Token(7)));
    assert_ne!(Datum::new_opaque(Token(7)), Datum::new_opaque(Token(8)));
}
