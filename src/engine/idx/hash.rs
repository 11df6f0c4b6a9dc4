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

//! An Fx-style word hasher for the index maps. Index keys are short
//! (attribute names, folded scalars) and never attacker-controlled, so the
//! default SipHash buys nothing here.

use std::hash::{BuildHasherDefault, Hasher};

const PRIME: u64 = 0x517c_c1b7_2722_0a95; // archimedes (obtained from rustc)
const ROTATE: u32 = 5;

pub type FxBuildHasher = BuildHasherDefault<FxHasher64>;
pub type FxHashMap<K, V> = std::collections::HashMap<K, V, FxBuildHasher>;
pub type FxHashSet<T> = std::collections::HashSet<T, FxBuildHasher>;

#[derive(Debug, Default)]
pub struct FxHasher64 {
    state: u64,
}

impl FxHasher64 {
    #[inline(always)]
    fn fold(&mut self, word: u64) {
        self.state = (self.state.rotate_left(ROTATE) ^ word).wrapping_mul(PRIME);
    }
}

impl Hasher for FxHasher64 {
    fn finish(&self) -> u64 {
        self.state
    }
    fn write(&mut self, mut bytes: &[u8]) {
        while bytes.len() >= 8 {
            self.fold(u64::from_ne_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]));
            bytes = &bytes[8..];
        }
        if bytes.len() >= 4 {
            self.fold(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u64);
            bytes = &bytes[4..];
        }
        if bytes.len() >= 2 {
            self.fold(u16::from_ne_bytes([bytes[0], bytes[1]]) as u64);
            bytes = &bytes[2..];
        }
        if let [b] = bytes {
            self.fold(*b as u64);
        }
    }
    fn write_u8(&mut self, v: u8) {
        self.fold(v as u64);
    }
    fn write_u16(&mut self, v: u16) {
        self.fold(v as u64);
    }
    fn write_u32(&mut self, v: u32) {
        self.fold(v as u64);
    }
    fn write_u64(&mut self, v: u64) {
        self.fold(v);
    }
    fn write_usize(&mut self, v: usize) {
        self.fold(v as u64);
    }
    fn write_i64(&mut self, v: i64) {
        self.fold(v as u64);
    }
}

#[test]
fn stable_for_equal_input() {
    fn hash_of(s: &str) -> u64 {
        let mut h = FxHasher64::default();
        h.write(s.as_bytes());
        h.finish()
    }
    assert_eq!(hash_of("guitar"), hash_of("guitar"));
    assert_ne!(hash_of("guitar"), hash_of("drums"));
}
