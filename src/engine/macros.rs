/*
 * Created on Sat Feb 21 2026
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

macro_rules! enum_impls {
    ($for:ident<$lt:lifetime> => {$($other:ty as $me:ident),*$(,)?}) => {
        $(impl<$lt> ::core::convert::From<$other> for $for<$lt> {fn from(v: $other) -> Self {Self::$me(v.into())}})*
    };
    ($for:ty => {$($other:ty as $me:ident),*$(,)?}) => {
        $(impl ::core::convert::From<$other> for $for {fn from(v: $other) -> Self {Self::$me(v.into())}})*
    };
}

/// Build an [`AttrMap`](crate::AttrMap) record literal:
///
/// ```
/// use attrtable::attrmap;
///
/// let rec = attrmap! { "first" => "Rosalind", "born" => 1920 };
/// assert_eq!(rec.len(), 2);
/// ```
#[macro_export]
macro_rules! attrmap {
    () => { $crate::AttrMap::new() };
    ($($attr:expr => $data:expr),* $(,)?) => {{
        let mut map = $crate::AttrMap::new();
        $(map.set($attr, $data);)*
        map
    }};
}

#[cfg(test)]
macro_rules! multi_assert_eq {
    ($($lhs:expr),* => $rhs:expr) => {
        $(assert_eq!($lhs, $rhs);)*
    };
}
