/*
 * Created on Sun Jul 12 2026
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
    super::{attr_of, musicians},
    crate::{attrmap, Datum, RecordData, Table, TableError},
    rand::{rngs::StdRng, Rng, SeedableRng},
};

fn squares_table() -> Table {
    let mut table = Table::builder().exclude(["i**2"]).build().unwrap();
    table
        .extend((0i64..10).map(|i| attrmap! { "i" => i, "i//2" => i / 2, "i**2" => i * i }))
        .unwrap();
    table
}

#[track_caller]
fn assert_square_free(table: &Table) {
    assert!(!table.attributes().iter().any(|a| a.as_ref() == "i**2"));
    assert_eq!(
        table.query_one([("i**2", 4)]),
        Err(TableError::UnknownAttribute("i**2".into()))
    );
}

#[test]
fn excluded_attributes_never_get_indexed() {
    let mut table = squares_table();
    assert_square_free(&table);

    // a reindex skips the exclusion silently; naming it does not
    table.reindex().unwrap();
    assert_square_free(&table);
    assert_eq!(table.reindex_attr("i**2"), Err(TableError::ExcludedAttribute("i**2".into())));
    assert_square_free(&table);

    assert_eq!(table.add_attribute("i**2"), Err(TableError::ExcludedAttribute("i**2".into())));
    assert_square_free(&table);

    // records keep carrying the value; it just never reaches the index
    table.add(attrmap! { "i" => 10, "i//2" => 5, "i**2" => 100 }).unwrap();
    assert_square_free(&table);
    assert_eq!(attr_of(table.get(10).unwrap(), "i**2"), Datum::Int(100));

    // updates refuse the exclusion and leave everything untouched
    let q = table.handle();
    assert_eq!(
        table.update(&attrmap! { "i**2" => 21.1 }, q.attr("i").unwrap().eq(1)),
        Err(TableError::ExcludedAttribute("i**2".into()))
    );
    assert_eq!(attr_of(table.query_one([("i", 1)]).unwrap().unwrap(), "i**2"), Datum::Int(1));
    assert_square_free(&table);
}

#[test]
fn allow_lists_pin_the_attribute_set() {
    let mut records = musicians();
    records[4].set("extra", "test");
    let table = Table::builder()
        .attributes(["first", "last", "born", "role"])
        .build_with(records)
        .unwrap();
    assert_eq!(table.len(), 5);
    // `extra` was carried by a record but never indexed
    assert_eq!(
        table.query_one([("extra", "test")]),
        Err(TableError::UnknownAttribute("extra".into()))
    );
    assert_eq!(
        table.count([("extra", Datum::Null)]),
        Err(TableError::UnknownAttribute("extra".into()))
    );
}

#[test]
fn allow_list_and_exclusion_must_not_overlap() {
    let built: Result<Table, TableError> =
        Table::builder().attributes(["a", "b"]).exclude(["b"]).build();
    assert_eq!(built.map(|_| ()), Err(TableError::ExcludedAttribute("b".into())));
}

#[test]
fn add_attribute_back_fills_eagerly() {
    let mut records = musicians();
    records[4].set("extra", "test");
    let mut table = Table::builder()
        .attributes(["first", "last", "born", "role"])
        .build_with(records)
        .unwrap();

    // without a default, four records cannot be covered
    assert_eq!(
        table.add_attribute("extra"),
        Err(TableError::MissingAttribute("extra".into()))
    );
    table.add_attribute_with("extra", "added").unwrap();
    assert_eq!(table.count([("extra", "test")]).unwrap(), 1);
    assert_eq!(table.count([("extra", "added")]).unwrap(), 4);
    // the default was written through into the records
    assert_eq!(attr_of(table.query_one([("first", "John")]).unwrap().unwrap(), "extra"), Datum::from("added"));

    // an empty-sequence default is queryable through the sentinel
    table.add_attribute_with("bands", Datum::List(vec![])).unwrap();
    assert_eq!(table.count([("bands", Datum::List(vec![]))]).unwrap(), 5);

    // adding an attribute the table already indexes is a no-op
    table.add_attribute("extra").unwrap();
    assert_eq!(table.count([("extra", "added")]).unwrap(), 4);
}

#[test]
fn add_attribute_using_a_generator() {
    let mut table = Table::builder().build_with(musicians()).unwrap();
    let mut next = 0i64;
    table
        .add_attribute_using("seq", move || {
            next += 1;
            Datum::Int(next - 1)
        })
        .unwrap();
    for slot in 0..5i64 {
        assert_eq!(attr_of(table.get(slot as usize).unwrap(), "seq"), Datum::Int(slot));
    }
}

#[test]
fn attributes_can_be_added_before_any_record() {
    let mut table = Table::new();
    table.add_attribute_with("bb", Datum::List(vec![])).unwrap();
    assert!(table.is_indexed("bb"));
    table.add(attrmap! { "a" => 1, "bb" => 2, "x" => 3 }).unwrap();
    assert!(table.is_indexed("a"));
    assert!(table.is_indexed("x"));
    assert_eq!(table.count([("bb", 2)]).unwrap(), 1);
}

#[test]
fn auto_add_uses_the_table_default_for_nulls() {
    let mut records = musicians();
    records[4].set("extra", "test");

    // one at a time, with a null default: earlier records pick up nulls
    let mut table = Table::builder().default_value(Datum::Null).build().unwrap();
    for record in records.clone() {
        table.add(record).unwrap();
    }
    assert_eq!(table.len(), 5);
    assert_eq!(table.count([("extra", Datum::Null)]).unwrap(), 4);

    // without a default the introduction is refused outright
    let mut bare = Table::new();
    for record in records.iter().take(4).cloned() {
        bare.add(record).unwrap();
    }
    assert_eq!(
        bare.add(records[4].clone()),
        Err(TableError::MissingAttribute("extra".into()))
    );
}

#[test]
fn reindex_is_idempotent_for_queries() {
    let mut table = Table::builder().build_with(musicians()).unwrap();
    let before: Vec<usize> = ["guitar", "bass", "drums", "producer"]
        .iter()
        .map(|role| table.count([("role", *role)]).unwrap())
        .collect();
    table.reindex().unwrap();
    let after: Vec<usize> = ["guitar", "bass", "drums", "producer"]
        .iter()
        .map(|role| table.count([("role", *role)]).unwrap())
        .collect();
    assert_eq!(before, after);
    assert_eq!(before, vec![2, 1, 1, 1]);
}

#[test]
fn random_mutations_keep_store_and_index_agreeing() {
    let mut rng = StdRng::seed_from_u64(0xbea7);
    let mut table = Table::new();
    for _ in 0..200 {
        let a = rng.gen_range(0i64..10);
        let b = rng.gen_range(0i64..10);
        table.add(attrmap! { "a" => a, "b" => b }).unwrap();
    }
    for _ in 0..60 {
        let slot = rng.gen_range(0usize..200);
        if table.contains([("_index", slot as i64)]).unwrap() {
            table.remove([("_index", slot as i64)]).unwrap();
        }
    }
    // the index answers exactly what a full scan answers
    for v in 0i64..10 {
        let scanned = table.iter().filter(|r| r.get("a") == Some(&Datum::Int(v))).count();
        assert_eq!(table.count([("a", v)]).unwrap(), scanned);
    }
    // and a rebuild changes nothing
    let before: Vec<usize> = (0i64..10).map(|v| table.count([("b", v)]).unwrap()).collect();
    table.reindex().unwrap();
    let after: Vec<usize> = (0i64..10).map(|v| table.count([("b", v)]).unwrap()).collect();
    assert_eq!(before, after);
}

// object mode: a rigid host type speaking the record protocol

#[derive(Debug, Clone, PartialEq)]
struct Sensor {
    name: Box<str>,
    reading: i64,
}

impl Sensor {
    fn new(name: &str, reading: i64) -> Self {
        Self { name: name.into(), reading }
    }
}

impl RecordData for Sensor {
    fn read_attr(&self, attr: &str) -> Option<Datum> {
        match attr {
            "name" => Some(Datum::Str(self.name.clone())),
            "reading" => Some(Datum::Int(self.reading)),
            _ => None,
        }
    }
    fn write_attr(&mut self, attr: &str, value: Datum) {
        match (attr, value) {
            ("name", Datum::Str(s)) => self.name = s,
            ("reading", Datum::Int(i)) => self.reading = i,
            _ => {}
        }
    }
    fn attr_names(&self) -> Vec<Box<str>> {
        vec!["name".into(), "reading".into()]
    }
}

#[test]
fn object_mode_records_as_queries() {
    let mut table = Table::<Sensor>::builder().object_mode().index_objects(true).build().unwrap();
    table.add(Sensor::new("alpha", 10)).unwrap();
    table.add(Sensor::new("beta", 12)).unwrap();
    assert!(table.is_indexed("name"));

    let probe = Sensor::new("alpha", 10);
    assert!(table.contains(&probe).unwrap());
    assert_eq!(table.query_one(&probe).unwrap(), Some(&Sensor::new("alpha", 10)));
    assert_eq!(table.count([("reading", 12)]).unwrap(), 1);

    // updates write through the record protocol and repost
    table.update(&attrmap! { "reading" => 15 }, [("name", "beta")]).unwrap();
    assert_eq!(table.query_one([("reading", 15)]).unwrap(), Some(&Sensor::new("beta", 15)));

    // with object indexing off, records stop being acceptable probes
    table.set_index_objects(false);
    assert_eq!(
        table.contains(&probe),
        Err(TableError::BadQuery(
            "records are not queryable unless object indexing is enabled"
        ))
    );
    // the mapping form keeps working
    assert_eq!(table.count([("name", "alpha")]).unwrap(), 1);
}

#[test]
fn object_mode_without_indexing_needs_explicit_attributes() {
    let mut table = Table::<Sensor>::builder().object_mode().build().unwrap();
    table.add(Sensor::new("alpha", 10)).unwrap();
    // nothing was auto-indexed
    assert!(table.attributes().is_empty());
    table.add_attribute("name").unwrap();
    assert_eq!(table.count([("name", "alpha")]).unwrap(), 1);
}
