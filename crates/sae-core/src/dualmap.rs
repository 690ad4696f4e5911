// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A bidirectional lookup table between two key types.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{CoreError, CoreResult};

/// A two-way unordered map.
///
/// Every inserted pair can be looked up from the left value ([`ltor`](Self::ltor))
/// or from the right value ([`rtol`](Self::rtol)). Both sides keep their own hash
/// table, so each side needs `Clone + Eq + Hash`.
///
/// # Example
///
/// ```rust
/// use sae_core::DualMap;
///
/// let colors: DualMap<&str, u8> = [("red", 1), ("green", 2)].into_iter().collect();
/// assert_eq!(colors.ltor(&"green").unwrap(), &2);
/// assert_eq!(colors.rtol(&1).unwrap(), &"red");
/// ```
#[derive(Debug, Clone)]
pub struct DualMap<L, R> {
    l_to_r: HashMap<L, R>,
    r_to_l: HashMap<R, L>,
}

impl<L, R> Default for DualMap<L, R> {
    fn default() -> Self {
        Self {
            l_to_r: HashMap::new(),
            r_to_l: HashMap::new(),
        }
    }
}

impl<L, R> DualMap<L, R>
where
    L: Clone + Eq + Hash + std::fmt::Debug,
    R: Clone + Eq + Hash + std::fmt::Debug,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pair in both directions.
    ///
    /// A side that already holds one of the keys keeps its existing mapping.
    /// Returns `true` only if both keys were new.
    pub fn insert(&mut self, (left, right): (L, R)) -> bool {
        let fresh_left = match self.l_to_r.entry(left.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(right.clone());
                true
            }
            Entry::Occupied(_) => false,
        };
        let fresh_right = match self.r_to_l.entry(right) {
            Entry::Vacant(slot) => {
                slot.insert(left);
                true
            }
            Entry::Occupied(_) => false,
        };
        fresh_left && fresh_right
    }

    /// Looks up the right value paired with `left`.
    pub fn ltor(&self, left: &L) -> CoreResult<&R> {
        self.l_to_r
            .get(left)
            .ok_or_else(|| CoreError::key_not_found(left))
    }

    /// Looks up the left value paired with `right`.
    pub fn rtol(&self, right: &R) -> CoreResult<&L> {
        self.r_to_l
            .get(right)
            .ok_or_else(|| CoreError::key_not_found(right))
    }

    /// Returns the right value paired with `left`, if any.
    pub fn get_right(&self, left: &L) -> Option<&R> {
        self.l_to_r.get(left)
    }

    /// Returns the left value paired with `right`, if any.
    pub fn get_left(&self, right: &R) -> Option<&L> {
        self.r_to_l.get(right)
    }

    /// Returns `true` if `left` is a known left key.
    pub fn contains_left(&self, left: &L) -> bool {
        self.l_to_r.contains_key(left)
    }

    /// Returns `true` if `right` is a known right key.
    pub fn contains_right(&self, right: &R) -> bool {
        self.r_to_l.contains_key(right)
    }

    /// Number of left keys.
    pub fn len(&self) -> usize {
        self.l_to_r.len()
    }

    /// Returns `true` if no pair was inserted.
    pub fn is_empty(&self) -> bool {
        self.l_to_r.is_empty()
    }

    /// Iterates over `(left, right)` pairs in hash order.
    pub fn iter(&self) -> impl Iterator<Item = (&L, &R)> {
        self.l_to_r.iter()
    }
}

impl<L, R> FromIterator<(L, R)> for DualMap<L, R>
where
    L: Clone + Eq + Hash + std::fmt::Debug,
    R: Clone + Eq + Hash + std::fmt::Debug,
{
    fn from_iter<I: IntoIterator<Item = (L, R)>>(iter: I) -> Self {
        let mut map = Self::new();
        for pair in iter {
            map.insert(pair);
        }
        map
    }
}
