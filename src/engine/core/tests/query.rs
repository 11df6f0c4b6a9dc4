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
    super::{attr_of, band, musicians, musicians_multirole},
    crate::{attrmap, AttrMap, Datum, Table, TableError},
};

#[test]
fn equality_and_inequality_counts() {
    let table = band();
    let q = table.handle();
    assert_eq!(table.count([("role", "guitar")]).unwrap(), 2);
    assert_eq!(table.count(q.attr("born").unwrap().le(1940)).unwrap(), 3);
    assert_eq!(
        table
            .count(q.attr("first").unwrap().eq("George") & q.attr("born").unwrap().lt(1940))
            .unwrap(),
        1
    );
}

#[test]
fn sequence_valued_attributes_expand() {
    let table = Table::builder().build_with(musicians_multirole()).unwrap();
    let q = table.handle();
    let role = q.attr("role").unwrap();

    assert_eq!(table.count([("role", "strings")]).unwrap(), 3);
    // conjunction of two equality terms over the same attribute
    assert_eq!(table.count([("role", "strings"), ("role", "bass")]).unwrap(), 1);
    // a sequence probe means "carries all of these"
    let strings_and_bass = vec![Datum::from("strings"), Datum::from("bass")];
    assert_eq!(table.count([("role", strings_and_bass.clone())]).unwrap(), 1);
    assert_eq!(
        table.count(role.eq(strings_and_bass.clone()) & q.attr("first").unwrap().eq("Paul")).unwrap(),
        1
    );
    assert_eq!(table.count(role.eq("strings") & role.eq("bass")).unwrap(), 1);
}

#[test]
fn algebra_over_a_table_with_a_hole() {
    let mut table = band();
    table.remove([("first", "Paul")]).unwrap();
    assert_eq!(table.len(), 4);
    table.set_always_return_list(true);
    let q = table.handle();
    let born = q.attr("born").unwrap();
    let first = q.attr("first").unwrap();
    let ix = q.index();

    multi_assert_eq!(
        table.count(ix.eq(0)).unwrap(),
        table.count(born.le(1940) & ix.eq(0)).unwrap()
        => 1
    );
    assert_eq!(table.count(ix.eq(1)).unwrap(), 0);

    assert_eq!(table.count(born.le(1940)).unwrap(), 3);
    assert_eq!(table.count(ix.eq(2) & born.le(1940)).unwrap(), 0);
    assert_eq!(table.count(born.lt(1940)).unwrap(), 1);
    assert_eq!(table.count(born.lt(1950) & ix.eq(2)).unwrap(), 1);
    assert_eq!(table.count(born.ge(1940)).unwrap(), 3);
    assert_eq!(table.count(ix.eq(2) & born.ge(1940)).unwrap(), 1);
    assert_eq!(table.count(born.gt(1940)).unwrap(), 1);
    assert_eq!(table.count(ix.eq(1) & born.gt(1940)).unwrap(), 0);

    assert_eq!(table.count(first.eq("Ringo") | !first.eq("George")).unwrap(), 2);
    assert_eq!(table.count(first.eq("Ringo") | first.ne("George")).unwrap(), 2);

    // a proxy with no comparison applied matches nothing
    assert_eq!(table.count(&first).unwrap(), 0);
}

#[test]
fn every_query_form_selects_the_same_record() {
    let table = band();
    let records = musicians();
    let q = table.handle();

    assert_eq!(table.query_one([("first", "John")]).unwrap(), Some(&records[0]));
    assert_eq!(table.query_one(&records[0]).unwrap(), Some(&records[0]));
    assert_eq!(table.query_one(q.attr("first").unwrap().eq("John")).unwrap(), Some(&records[0]));

    assert_eq!(
        table.query_one([("first", "George"), ("last", "Harrison")]).unwrap(),
        Some(&records[2])
    );
    assert_eq!(
        table
            .query_one(q.attr("first").unwrap().eq("George") & q.attr("last").unwrap().eq("Harrison"))
            .unwrap(),
        Some(&records[2])
    );
    assert_eq!(
        table
            .query_one(
                q.attr("first").unwrap().eq("George")
                    & q.attr("born").unwrap().lt(2000)
                    & q.attr("last").unwrap().eq("Harrison")
            )
            .unwrap(),
        Some(&records[2])
    );

    // membership
    assert!(table.contains(&attrmap! { "first" => "George", "last" => "Harrison" }).unwrap());
    assert!(table.contains(q.attr("first").unwrap().eq("George")).unwrap());
    assert!(!table.contains(&attrmap! { "first" => "George", "last" => "Starr" }).unwrap());
}

#[test]
fn slot_identity_through_the_index_pseudo_attribute() {
    let table = band();
    let records = musicians();
    let q = table.handle();
    for slot in 0..table.len() {
        assert_eq!(table.get(slot).unwrap(), &records[slot]);
        assert_eq!(table.query_one([("_index", slot as i64)]).unwrap(), Some(&records[slot]));
        assert_eq!(table.query_one(q.index().eq(slot as i64)).unwrap(), Some(&records[slot]));
        assert_eq!(table.iter().nth(slot).unwrap(), &records[slot]);
    }
    assert_eq!(table.count(q.index().eq(0) & q.index().eq(1)).unwrap(), 0);
    assert_eq!(table.count([("_index", vec![Datum::Int(0), Datum::Int(1)])]).unwrap(), 0);
    assert_eq!(table.count([("_index", 100)]).unwrap(), 0);
}

#[test]
fn de_morgan_holds() {
    let table = band();
    let q = table.handle();
    let a = || q.attr("role").unwrap().eq("guitar");
    let b = || q.attr("born").unwrap().le(1940);

    let lhs: Vec<&AttrMap> = table.query(!(a() & b())).unwrap().collect();
    let rhs: Vec<&AttrMap> = table.query(!a() | !b()).unwrap().collect();
    assert_eq!(lhs, rhs);

    let lhs: Vec<&AttrMap> = table.query(!(a() | b())).unwrap().collect();
    let rhs: Vec<&AttrMap> = table.query(!a() & !b()).unwrap().collect();
    assert_eq!(lhs, rhs);
}

#[test]
fn count_agrees_with_query_length() {
    let table = band();
    let q = table.handle();
    let queries = [
        q.attr("role").unwrap().eq("guitar"),
        q.attr("born").unwrap().ge(1940),
        !q.attr("first").unwrap().eq("George"),
        q.attr("born").unwrap().ne(1940) | q.attr("role").unwrap().eq("drums"),
    ];
    for query in queries {
        assert_eq!(table.count(query.clone()).unwrap(), table.query(query).unwrap().count());
    }
}

#[test]
fn filters_scan_live_records_only() {
    let mut table = band();
    let q = table.handle();
    let georges_before_1940 = |r: &AttrMap| {
        r.get("first") == Some(&Datum::from("George"))
            && r.get("born").and_then(Datum::try_int).is_some_and(|born| born < 1940)
    };
    let hit = table.query_one(q.filter(georges_before_1940)).unwrap().unwrap();
    assert_eq!(attr_of(hit, "last"), Datum::from("Martin"));

    table.remove([("last", "Martin")]).unwrap();
    let q = table.handle();
    assert_eq!(table.count(q.filter(georges_before_1940)).unwrap(), 0);
}

#[test]
fn handles_expire_on_reindex() {
    let mut table = band();
    let q = table.handle();
    assert_eq!(table.count(q.attr("first").unwrap().eq("John")).unwrap(), 1);

    table.reindex().unwrap();
    assert_eq!(
        table.count(q.attr("first").unwrap().eq("John")),
        Err(TableError::StaleHandle)
    );

    // a combination with one stale side is stale as a whole
    let fresh = table.handle();
    assert_eq!(
        table.count(fresh.attr("born").unwrap().le(1940) & q.attr("first").unwrap().eq("John")),
        Err(TableError::StaleHandle)
    );

    // a handle asked at query time is always current
    assert_eq!(table.count(table.handle().attr("first").unwrap().eq("John")).unwrap(), 1);
}

#[test]
fn handles_are_pinned_to_their_table() {
    let table_a = band();
    let table_b = band();
    let qa = table_a.handle();
    let qb = table_b.handle();
    assert_eq!(
        table_a.count(qb.attr("first").unwrap().eq("John")),
        Err(TableError::BadQuery("the query was built by a handle of a different table"))
    );
    assert_eq!(
        table_a.count(qa.attr("first").unwrap().eq("John") & qb.attr("born").unwrap().le(1940)),
        Err(TableError::BadQuery("the query mixes handles of two different tables"))
    );
}

#[test]
fn eager_and_lazy_results_agree() {
    let mut table = band();
    let lazy: Vec<AttrMap> = table.query([("role", "guitar")]).unwrap().cloned().collect();
    table.set_always_return_list(true);
    let eager: Vec<AttrMap> = table.query([("role", "guitar")]).unwrap().cloned().collect();
    assert_eq!(lazy, eager);
    assert_eq!(lazy.len(), 2);
    // ascending slot order either way
    assert_eq!(attr_of(&lazy[0], "first"), Datum::from("John"));
    assert_eq!(attr_of(&lazy[1], "first"), Datum::from("George"));
}

#[test]
fn empty_tables_answer_without_attributes() {
    let mut table = Table::new();
    assert!(!table.contains(&attrmap! { "a" => "i" }).unwrap());
    assert_eq!(table.count([("a", "i")]).unwrap(), 0);
    assert_eq!(table.remove([("a", "i")]), Err(TableError::NoMatch));
    // the empty-query form stays an error
    assert_eq!(
        table.query_one(&AttrMap::new()),
        Err(TableError::BadQuery("the query names no attributes"))
    );
}

#[test]
fn unknown_attributes_error_once_the_table_has_records() {
    let table = band();
    assert_eq!(
        table.count([("height", 180)]),
        Err(TableError::UnknownAttribute("height".into()))
    );
    assert_eq!(
        table.handle().attr("height").unwrap_err(),
        TableError::UnknownAttribute("height".into())
    );
}
