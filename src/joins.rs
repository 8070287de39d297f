// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;
use std::hash::Hash;

/// Pairs every left row with the right row its foreign key points at.
/// A missing key or a dangling reference yields `None` rather than an error.
pub fn join_by_foreign_key<'a, L, R, K, FK, PK>(
    left: &'a [L],
    right: &'a [R],
    foreign_key: FK,
    primary_key: PK,
) -> Vec<(&'a L, Option<&'a R>)>
where
    K: Eq + Hash,
    FK: Fn(&L) -> Option<K>,
    PK: Fn(&R) -> K,
{
    let index: HashMap<K, &R> = right.iter().map(|r| (primary_key(r), r)).collect();
    left.iter()
        .map(|l| {
            let matched = foreign_key(l).and_then(|k| index.get(&k).copied());
            (l, matched)
        })
        .collect()
}

/// Name lookup for display columns, empty when the reference does not resolve.
pub fn name_of<R>(related: Option<&R>, name: impl Fn(&R) -> &str) -> String {
    related.map(|r| name(r).to_string()).unwrap_or_default()
}
