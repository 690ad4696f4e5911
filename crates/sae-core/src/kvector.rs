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

//! Insertion-ordered key/value storage with linear lookup.
//!
//! [`KeyVector`] suits small tables where keeping insertion order matters more
//! than lookup speed. [`IdVector`] adds an id counter on top so callers can
//! store values without picking keys themselves.

use std::ops::{Deref, DerefMut};

use crate::error::{CoreError, CoreResult};

/// Insertion-ordered vector of `(key, value)` entries.
///
/// Keys are not required to be unique; lookups return the first match.
#[derive(Debug, Clone)]
pub struct KeyVector<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Default for KeyVector<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq, V> KeyVector<K, V> {
    /// Creates an empty key vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry at the end.
    pub fn insert(&mut self, entry: (K, V)) {
        self.entries.push(entry);
    }

    /// Returns the first entry whose key equals `key`.
    pub fn find(&self, key: &K) -> Option<&(K, V)> {
        self.entries.iter().find(|(k, _)| k == key)
    }

    /// Returns the value of the first entry matching `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value of the first entry matching `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Like [`get`](Self::get) but reports a missing key as an error.
    pub fn at(&self, key: &K) -> CoreResult<&V>
    where
        K: std::fmt::Debug,
    {
        self.get(key).ok_or_else(|| CoreError::key_not_found(key))
    }

    /// Returns `true` if some entry has `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Removes every entry with `key`, returning how many were removed.
    pub fn erase(&mut self, key: &K) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        before - self.entries.len()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, (K, V)> {
        self.entries.iter()
    }

    /// Iterates entries mutably in insertion order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, (K, V)> {
        self.entries.iter_mut()
    }
}

impl<'a, K, V> IntoIterator for &'a KeyVector<K, V> {
    type Item = &'a (K, V);
    type IntoIter = std::slice::Iter<'a, (K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: PartialEq, V> FromIterator<(K, V)> for KeyVector<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Identifier handed out by [`IdVector::insert`].
pub type Id = u32;

/// A [`KeyVector`] keyed by generated ids.
///
/// Ids start at `1` and increase by one per insertion; `0` is never handed out
/// unless the counter is reset with [`set_id_count`](Self::set_id_count).
#[derive(Debug, Clone)]
pub struct IdVector<T> {
    inner: KeyVector<Id, T>,
    id_count: Id,
}

impl<T> Default for IdVector<T> {
    fn default() -> Self {
        Self {
            inner: KeyVector::default(),
            id_count: 0,
        }
    }
}

impl<T> IdVector<T> {
    /// Creates an empty id vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under a fresh id and returns the id.
    pub fn insert(&mut self, value: T) -> Id {
        self.id_count = self.id_count.wrapping_add(1);
        let id = self.id_count;
        self.inner.insert((id, value));
        id
    }

    /// The last id handed out.
    pub fn id_count(&self) -> Id {
        self.id_count
    }

    /// Overrides the id counter; the next insertion uses `count + 1`.
    pub fn set_id_count(&mut self, count: Id) {
        self.id_count = count;
    }
}

impl<T> Deref for IdVector<T> {
    type Target = KeyVector<Id, T>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> DerefMut for IdVector<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_return_first_match() {
        let mut kv = KeyVector::new();
        kv.insert(("a", 1));
        kv.insert(("b", 2));
        kv.insert(("a", 3));

        assert_eq!(kv.get(&"a"), Some(&1));
        assert_eq!(kv.len(), 3);
        assert!(kv.contains(&"b"));
        assert!(!kv.contains(&"c"));
    }

    #[test]
    fn erase_removes_every_match() {
        let mut kv: KeyVector<_, _> = [("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
        assert_eq!(kv.erase(&"a"), 2);
        assert_eq!(kv.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn at_reports_missing_key() {
        let kv: KeyVector<u8, u8> = KeyVector::new();
        assert!(matches!(kv.at(&4), Err(CoreError::KeyNotFound(_))));
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut kv: KeyVector<_, _> = [("x", 10)].into_iter().collect();
        *kv.get_mut(&"x").unwrap() += 5;
        assert_eq!(kv.get(&"x"), Some(&15));
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let kv: KeyVector<_, _> = [(3, 'c'), (1, 'a'), (2, 'b')].into_iter().collect();
        let keys: Vec<_> = (&kv).into_iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![3, 1, 2]);
    }

    #[test]
    fn id_vector_ids_start_at_one() {
        let mut ids = IdVector::new();
        let first = ids.insert("first");
        let second = ids.insert("second");

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(ids.id_count(), 2);
        assert_eq!(ids.get(&first), Some(&"first"));
    }

    #[test]
    fn id_vector_counter_can_be_moved() {
        let mut ids = IdVector::new();
        ids.set_id_count(41);
        assert_eq!(ids.insert(()), 42);
    }

    #[test]
    fn id_vector_erase_through_deref() {
        let mut ids = IdVector::new();
        let id = ids.insert(5u8);
        assert_eq!(ids.erase(&id), 1);
        assert!(ids.is_empty());
        // Erasing does not recycle ids.
        assert_eq!(ids.insert(6), 2);
    }
}
