/*
 * Created on Sun Mar 15 2026
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
            data::datum::{Datum, DatumKind, OpaqueData},
            error::{TableError, TableResult},
        },
        util,
    },
    std::{
        cmp::Ordering,
        fmt,
        hash::{Hash, Hasher},
        rc::Rc,
    },
};

// canonical quiet-NaN bits; every NaN keys into this bucket
const NAN_BITS: u64 = 0x7ff8_0000_0000_0000;
// 2^63 as a float; floats in [-2^63, 2^63) survive an exact i64 cast
const I64_SPAN: f64 = 9_223_372_036_854_775_808.0;

/// The normalized, hashable form a value is posted under.
///
/// Integers and integral floats fold into the same `Int` key, so `1940`
/// and `1940.0` land in one posting list. Non-integral floats key on their
/// canonical bit pattern (`-0.0` folds into `0.0` through the integral
/// path, NaNs all collapse into one bucket). `Empty` is the sentinel for
/// the empty sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(Box<str>),
    Empty,
    Opaque(OpaqueKey),
}

#[derive(Clone)]
pub struct OpaqueKey(Rc<dyn OpaqueData>);

impl PartialEq for OpaqueKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.opaque_eq(&*other.0)
    }
}

impl Eq for OpaqueKey {}

impl Hash for OpaqueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.opaque_hash());
    }
}

impl fmt::Debug for OpaqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "opaque({:?})", self.0)
    }
}

impl IndexKey {
    /// The key of a scalar value. Sequences and mappings have no scalar
    /// key; a sequence element that is itself one of those is unhashable.
    pub fn scalar(d: &Datum) -> TableResult<IndexKey> {
        let key = match d {
            Datum::Null => IndexKey::Null,
            Datum::Bool(b) => IndexKey::Bool(*b),
            Datum::Int(i) => IndexKey::Int(*i),
            Datum::Float(x) => Self::float_key(*x),
            Datum::Str(s) => IndexKey::Str(s.clone()),
            Datum::Opaque(o) => IndexKey::Opaque(OpaqueKey(o.clone())),
            Datum::List(_) | Datum::Map(_) => {
                return util::cold_rerr(TableError::Unhashable(d.kind()))
            }
        };
        Ok(key)
    }
    fn float_key(x: f64) -> IndexKey {
        if x.is_nan() {
            IndexKey::Float(NAN_BITS)
        } else if x == x.trunc() && x >= -I64_SPAN && x < I64_SPAN {
            IndexKey::Int(x as i64)
        } else {
            IndexKey::Float(x.to_bits())
        }
    }
}

/// Normalize a stored or queried value into the keys it is posted under.
/// This is the only place the index learns how a value decomposes: strings
/// stay whole, sequences expand to one key per element, the empty sequence
/// becomes the `Empty` sentinel, everything else is a single scalar key.
pub fn normalize(d: &Datum) -> TableResult<Vec<IndexKey>> {
    match d {
        Datum::Str(s) => Ok(vec![IndexKey::Str(s.clone())]),
        Datum::List(l) if l.is_empty() => Ok(vec![IndexKey::Empty]),
        Datum::List(l) => l.iter().map(IndexKey::scalar).collect(),
        Datum::Map(_) => util::cold_rerr(TableError::Unhashable(DatumKind::Map)),
        _ => Ok(vec![IndexKey::scalar(d)?]),
    }
}

/// Order between an index key and a probe value; `None` when the two are
/// not comparable. Inequality scans skip incomparable keys: numbers order
/// with numbers, strings with strings, booleans with booleans, and
/// everything else never satisfies an inequality.
pub fn key_probe_cmp(key: &IndexKey, probe: &Datum) -> Option<Ordering> {
    match (key, probe) {
        (IndexKey::Int(a), Datum::Int(b)) => Some(a.cmp(b)),
        (IndexKey::Int(a), Datum::Float(b)) => (*a as f64).partial_cmp(b),
        (IndexKey::Float(a), Datum::Int(b)) => f64::from_bits(*a).partial_cmp(&(*b as f64)),
        (IndexKey::Float(a), Datum::Float(b)) => f64::from_bits(*a).partial_cmp(b),
        (IndexKey::Str(a), Datum::Str(b)) => Some(a.as_ref().cmp(b.as_ref())),
        (IndexKey::Bool(a), Datum::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[test]
fn numeric_folding() {
    assert_eq!(IndexKey::scalar(&Datum::Float(1940.0)), Ok(IndexKey::Int(1940)));
    assert_eq!(IndexKey::scalar(&Datum::Float(-0.0)), Ok(IndexKey::Int(0)));
    assert_eq!(
        IndexKey::scalar(&Datum::Float(f64::NAN)),
        IndexKey::scalar(&Datum::Float(-f64::NAN))
    );
    assert_ne!(
        IndexKey::scalar(&Datum::Float(21.1)).unwrap(),
        IndexKey::Int(21)
    );
}

#[test]
fn sequence_expansion() {
    let roles = Datum::from(vec![Datum::from("guitar"), Datum::from("strings")]);
    assert_eq!(
        normalize(&roles).unwrap(),
        vec![IndexKey::Str("guitar".into()), IndexKey::Str("strings".into())]
    );
    assert_eq!(normalize(&Datum::List(vec![])).unwrap(), vec![IndexKey::Empty]);
    assert_eq!(
        normalize(&Datum::Map(crate::AttrMap::new())),
        Err(TableError::Unhashable(DatumKind::Map))
    );
}

#[test]
fn probe_comparisons() {
    use std::cmp::Ordering::*;
    assert_eq!(key_probe_cmp(&IndexKey::Int(1940), &Datum::Int(1942)), Some(Less));
    assert_eq!(key_probe_cmp(&IndexKey::Int(2), &Datum::Float(1.5)), Some(Greater));
    assert_eq!(key_probe_cmp(&IndexKey::Str("a".into()), &Datum::Int(1)), None);
    assert_eq!(key_probe_cmp(&IndexKey::Null, &Datum::Null), None);
}
