/*
 * Created on Sat Jul 04 2026
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

mod query;
mod schema;

use crate::{attrmap, AttrMap, Datum, Table};

/// The canonical fixture: five musicians, scalar roles.
fn musicians() -> Vec<AttrMap> {
    vec![
        attrmap! { "first" => "John", "last" => "Lennon", "born" => 1940, "role" => "guitar" }, // 0
        attrmap! { "first" => "Paul", "last" => "McCartney", "born" => 1942, "role" => "bass" }, // 1
        attrmap! { "first" => "George", "last" => "Harrison", "born" => 1943, "role" => "guitar" }, // 2
        attrmap! { "first" => "Ringo", "last" => "Starr", "born" => 1940, "role" => "drums" }, // 3
        attrmap! { "first" => "George", "last" => "Martin", "born" => 1926, "role" => "producer" }, // 4
    ]
}

/// The multi-valued variant: the string players carry a role sequence.
fn musicians_multirole() -> Vec<AttrMap> {
    fn roles(a: &str, b: &str) -> Datum {
        Datum::from(vec![Datum::from(a), Datum::from(b)])
    }
    vec![
        attrmap! { "first" => "John", "born" => 1940, "role" => roles("guitar", "strings") },
        attrmap! { "first" => "Paul", "born" => 1942, "role" => roles("bass", "strings") },
        attrmap! { "first" => "George", "born" => 1943, "role" => roles("guitar", "strings") },
        attrmap! { "first" => "Ringo", "born" => 1940, "role" => "drums" },
        attrmap! { "first" => "George", "born" => 1926, "role" => "producer" },
    ]
}

fn band() -> Table {
    Table::builder().build_with(musicians()).unwrap()
}

fn attr_of(record: &AttrMap, attr: &str) -> Datum {
    record.get(attr).cloned().unwrap()
}
