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

//! Lazily created singletons keyed by type and tag.
//!
//! Every singleton is addressed by its value type `T` plus a tag type `Tag`,
//! so unrelated parts of a program can each own "the" `Vec<String>` without
//! colliding: `global_tagged::<Vec<String>, LogTag>()` and
//! `global_tagged::<Vec<String>, HistoryTag>()` are different instances.
//! The untagged functions use `()` as the tag.
//!
//! Four flavours are provided:
//!
//! * [`global`]: shared `&'static T`, created once per process.
//! * [`threadsafe`]: a `&'static` [`ThreadsafeSingleton`] that must be locked.
//! * [`with_thread_local`]: one instance per thread, reached through a closure.
//! * [`unique`]: a [`UniqueSingleton`] handle holding the lock for its whole
//!   lifetime, with the instance created on first use and destroyable via
//!   [`UniqueSingleton::reset`].
//!
//! Process-wide instances are never dropped.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::error::{SyncError, SyncResult};
use crate::guard::{GuardHandle, ResourceGuard};

type SingletonKey = (TypeId, TypeId);

fn key_of<T: 'static, Tag: 'static>() -> SingletonKey {
    (TypeId::of::<T>(), TypeId::of::<Tag>())
}

/// A type map keyed by `(T, Tag)`.
///
/// This is the storage behind the process-wide singletons, usable on its own
/// wherever a scoped registry of "one value per type" is needed.
///
/// # Example
///
/// ```rust
/// use sae_sync::SingletonTable;
///
/// struct Primary;
///
/// let mut table = SingletonTable::new();
/// table.insert(8u16);
/// table.insert_tagged::<u16, Primary>(80);
///
/// assert_eq!(table.get::<u16>(), Some(&8));
/// assert_eq!(table.get_tagged::<u16, Primary>(), Some(&80));
/// ```
#[derive(Default)]
pub struct SingletonTable {
    entries: HashMap<SingletonKey, Box<dyn Any + Send + Sync>>,
}

impl SingletonTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Inserts the untagged instance of `T`, returning the one it replaced.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.insert_tagged::<T, ()>(value)
    }

    /// Inserts the `Tag` instance of `T`, returning the one it replaced.
    pub fn insert_tagged<T: Send + Sync + 'static, Tag: 'static>(&mut self, value: T) -> Option<T> {
        self.entries
            .insert(key_of::<T, Tag>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Returns the untagged instance of `T`.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.get_tagged::<T, ()>()
    }

    /// Returns the `Tag` instance of `T`.
    #[must_use]
    pub fn get_tagged<T: Send + Sync + 'static, Tag: 'static>(&self) -> Option<&T> {
        self.entries
            .get(&key_of::<T, Tag>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// Returns the untagged instance of `T`, inserting `init()` first if absent.
    pub fn get_or_insert_with<T: Send + Sync + 'static>(&mut self, init: impl FnOnce() -> T) -> &mut T {
        self.get_or_insert_with_tagged::<T, ()>(init)
    }

    /// Returns the `Tag` instance of `T`, inserting `init()` first if absent.
    pub fn get_or_insert_with_tagged<T: Send + Sync + 'static, Tag: 'static>(
        &mut self,
        init: impl FnOnce() -> T,
    ) -> &mut T {
        self.entries
            .entry(key_of::<T, Tag>())
            .or_insert_with(|| Box::new(init()) as Box<dyn Any + Send + Sync>)
            .downcast_mut::<T>()
            .expect("singleton table entries are keyed by their own TypeId")
    }

    /// Removes and returns the `Tag` instance of `T`.
    pub fn remove_tagged<T: Send + Sync + 'static, Tag: 'static>(&mut self) -> Option<T> {
        self.entries
            .remove(&key_of::<T, Tag>())
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Returns `true` if the untagged instance of `T` is present.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.contains_tagged::<T, ()>()
    }

    /// Returns `true` if the `Tag` instance of `T` is present.
    #[must_use]
    pub fn contains_tagged<T: Send + Sync + 'static, Tag: 'static>(&self) -> bool {
        self.entries.contains_key(&key_of::<T, Tag>())
    }

    /// Number of stored instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for SingletonTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonTable")
            .field("len", &self.entries.len())
            .finish()
    }
}

fn process_table() -> MutexGuard<'static, SingletonTable> {
    static TABLE: OnceLock<Mutex<SingletonTable>> = OnceLock::new();
    TABLE
        .get_or_init(|| Mutex::new(SingletonTable::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// The `'static` cell holding the `(T, Tag)` instance.
///
/// Only the cell is created under the table lock. The value is built by the
/// cell itself, so `T::default()` may use other singletons freely.
fn process_slot<T: Send + Sync + 'static, Tag: 'static>() -> &'static OnceLock<T> {
    let mut table = process_table();
    *table.get_or_insert_with_tagged::<&'static OnceLock<T>, Tag>(|| &*Box::leak(Box::new(OnceLock::new())))
}

/// Returns the process-wide untagged instance of `T`, creating it on first use.
pub fn global<T: Default + Send + Sync + 'static>() -> &'static T {
    global_tagged::<T, ()>()
}

/// Returns the process-wide `Tag` instance of `T`, creating it on first use.
///
/// Concurrent first calls construct the value exactly once.
pub fn global_tagged<T: Default + Send + Sync + 'static, Tag: 'static>() -> &'static T {
    process_slot::<T, Tag>().get_or_init(|| {
        log::debug!(
            "Creating singleton {} (tag {}).",
            std::any::type_name::<T>(),
            std::any::type_name::<Tag>()
        );
        T::default()
    })
}

/// A process-wide value that has to be locked before use.
#[derive(Debug, Default)]
pub struct ThreadsafeSingleton<T> {
    guard: ResourceGuard<T>,
}

impl<T> ThreadsafeSingleton<T> {
    /// Blocks until the value is free.
    pub fn lock(&self) -> GuardHandle<'_, T> {
        self.guard.acquire()
    }

    /// Returns a handle if the value is free right now.
    pub fn try_lock(&self) -> Option<GuardHandle<'_, T>> {
        self.guard.try_acquire()
    }

    /// Runs `f` with the value locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.guard.with(f)
    }
}

/// Returns the process-wide untagged lockable instance of `T`.
pub fn threadsafe<T: Default + Send + 'static>() -> &'static ThreadsafeSingleton<T> {
    threadsafe_tagged::<T, ()>()
}

/// Returns the process-wide `Tag` lockable instance of `T`.
pub fn threadsafe_tagged<T: Default + Send + 'static, Tag: 'static>() -> &'static ThreadsafeSingleton<T> {
    global_tagged::<ThreadsafeSingleton<T>, Tag>()
}

thread_local! {
    static THREAD_TABLE: RefCell<HashMap<SingletonKey, Rc<dyn Any>>> = RefCell::new(HashMap::new());
}

/// Runs `f` with this thread's untagged instance of `T`.
pub fn with_thread_local<T: Default + 'static, R>(f: impl FnOnce(&mut T) -> R) -> R {
    with_thread_local_tagged::<T, (), R>(f)
}

/// Runs `f` with this thread's `Tag` instance of `T`, creating it on first use.
///
/// # Panics
///
/// Panics if `f` reaches for the same `(T, Tag)` instance again.
pub fn with_thread_local_tagged<T: Default + 'static, Tag: 'static, R>(f: impl FnOnce(&mut T) -> R) -> R {
    let key = key_of::<T, Tag>();
    let existing = THREAD_TABLE.with(|table| table.borrow().get(&key).map(Rc::clone));
    let entry = match existing {
        Some(entry) => entry,
        None => {
            // Built with the table unborrowed, so `T::default()` may use other singletons.
            let fresh = Rc::new(RefCell::new(T::default())) as Rc<dyn Any>;
            THREAD_TABLE.with(|table| Rc::clone(table.borrow_mut().entry(key).or_insert(fresh)))
        }
    };
    let cell: Rc<RefCell<T>> = entry
        .downcast::<RefCell<T>>()
        .expect("thread singleton entries are keyed by their own TypeId");
    let mut value = cell.borrow_mut();
    f(&mut value)
}

struct UniqueSlot<T> {
    value: Mutex<Option<T>>,
}

impl<T> Default for UniqueSlot<T> {
    fn default() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }
}

/// Exclusive handle to a process-wide instance.
///
/// The handle owns the instance's lock from creation until it is dropped or
/// [`release_lock`](Self::release_lock) is called; another [`unique`] call for the
/// same `(T, Tag)` blocks meanwhile. The instance itself is created lazily on
/// the first [`value`](Self::value) access.
#[must_use = "the singleton is unlocked as soon as the handle is dropped"]
pub struct UniqueSingleton<T: 'static> {
    guard: Option<MutexGuard<'static, Option<T>>>,
}

impl<T: Default + 'static> UniqueSingleton<T> {
    fn locked(slot: &'static UniqueSlot<T>) -> Self {
        Self {
            guard: Some(slot.value.lock().unwrap_or_else(PoisonError::into_inner)),
        }
    }

    /// Returns `true` while this handle holds the lock.
    pub fn has_lock(&self) -> bool {
        self.guard.is_some()
    }

    /// Gives the lock back. The handle is unusable afterwards.
    pub fn release_lock(&mut self) {
        self.guard = None;
    }

    /// Returns `true` if the instance currently exists.
    pub fn has_value(&self) -> SyncResult<bool> {
        self.guard
            .as_ref()
            .map(|g| g.is_some())
            .ok_or(SyncError::LockReleased)
    }

    /// Returns the instance, creating it if needed.
    pub fn value(&mut self) -> SyncResult<&T> {
        self.value_mut().map(|v| &*v)
    }

    /// Returns the instance mutably, creating it if needed.
    pub fn value_mut(&mut self) -> SyncResult<&mut T> {
        let guard = self.guard.as_mut().ok_or(SyncError::LockReleased)?;
        Ok(guard.get_or_insert_with(T::default))
    }

    /// Destroys the instance; the next access creates a fresh one.
    pub fn reset(&mut self) -> SyncResult<()> {
        let guard = self.guard.as_mut().ok_or(SyncError::LockReleased)?;
        guard.take();
        Ok(())
    }
}

impl<T: 'static> std::fmt::Debug for UniqueSingleton<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniqueSingleton")
            .field("type", &std::any::type_name::<T>())
            .field("has_lock", &self.guard.is_some())
            .finish()
    }
}

/// Locks the process-wide untagged instance of `T` for exclusive use.
pub fn unique<T: Default + Send + 'static>() -> UniqueSingleton<T> {
    unique_tagged::<T, ()>()
}

/// Locks the process-wide `Tag` instance of `T` for exclusive use.
pub fn unique_tagged<T: Default + Send + 'static, Tag: 'static>() -> UniqueSingleton<T> {
    UniqueSingleton::locked(global_tagged::<UniqueSlot<T>, Tag>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    // Tags keep each test's instances apart, since the table is process-wide.
    struct GlobalTest;
    struct OtherTag;
    struct ThreadsafeTest;
    struct ThreadLocalTest;
    struct UniqueTest;
    struct UniqueResetTest;

    #[test]
    fn table_insert_get_replace() {
        let mut table = SingletonTable::new();
        assert!(table.insert(String::from("old")).is_none());
        assert_eq!(table.insert(String::from("new")).as_deref(), Some("old"));
        assert_eq!(table.get::<String>().map(String::as_str), Some("new"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn table_tags_separate_instances() {
        let mut table = SingletonTable::new();
        table.insert(1u8);
        table.insert_tagged::<u8, OtherTag>(2);
        assert_eq!(table.get::<u8>(), Some(&1));
        assert_eq!(table.get_tagged::<u8, OtherTag>(), Some(&2));
        assert_eq!(table.remove_tagged::<u8, OtherTag>(), Some(2));
        assert!(!table.contains_tagged::<u8, OtherTag>());
        assert!(table.contains::<u8>());
    }

    #[test]
    fn table_get_or_insert_with_keeps_existing() {
        let mut table = SingletonTable::new();
        *table.get_or_insert_with_tagged::<u32, ()>(|| 5) += 1;
        assert_eq!(*table.get_or_insert_with_tagged::<u32, ()>(|| 100), 6);
    }

    #[test]
    fn global_returns_same_instance() {
        let a: &'static AtomicUsize = global_tagged::<AtomicUsize, GlobalTest>();
        let b: &'static AtomicUsize = global_tagged::<AtomicUsize, GlobalTest>();
        assert!(std::ptr::eq(a, b));

        let other = global_tagged::<AtomicUsize, OtherTag>();
        assert!(!std::ptr::eq(a, other));
    }

    static CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

    struct CountedTag;

    #[derive(Debug)]
    struct CountOnBuild;

    impl Default for CountOnBuild {
        fn default() -> Self {
            CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(5));
            Self
        }
    }

    #[test]
    fn concurrent_first_access_constructs_once() {
        let workers: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| global_tagged::<CountOnBuild, CountedTag>() as *const _ as usize))
            .collect();
        let addresses: Vec<usize> = workers.into_iter().map(|w| w.join().unwrap()).collect();

        assert_eq!(CONSTRUCTIONS.load(Ordering::SeqCst), 1);
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn threadsafe_singleton_serialises_updates() {
        let workers: Vec<_> = (0..4)
            .map(|_| {
                thread::spawn(|| {
                    for _ in 0..250 {
                        *threadsafe_tagged::<u64, ThreadsafeTest>().lock() += 1;
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(threadsafe_tagged::<u64, ThreadsafeTest>().with(|v| *v), 1000);
    }

    #[test]
    fn thread_local_instances_are_per_thread() {
        with_thread_local_tagged::<Vec<u8>, ThreadLocalTest, _>(|v| v.push(1));
        with_thread_local_tagged::<Vec<u8>, ThreadLocalTest, _>(|v| v.push(2));

        let seen_elsewhere = thread::spawn(|| with_thread_local_tagged::<Vec<u8>, ThreadLocalTest, _>(|v| v.len()))
            .join()
            .unwrap();

        assert_eq!(seen_elsewhere, 0);
        assert_eq!(with_thread_local_tagged::<Vec<u8>, ThreadLocalTest, _>(|v| v.clone()), vec![1, 2]);
    }

    #[test]
    fn thread_local_allows_nesting_distinct_types() {
        let total = with_thread_local_tagged::<u32, ThreadLocalTest, _>(|outer| {
            *outer += 1;
            with_thread_local_tagged::<u64, ThreadLocalTest, _>(|inner| {
                *inner += 10;
                *inner + u64::from(*outer)
            })
        });
        assert!(total >= 11);
    }

    #[test]
    #[should_panic]
    fn thread_local_reentry_on_same_instance_panics() {
        struct Reentry;
        with_thread_local_tagged::<u8, Reentry, _>(|_| {
            with_thread_local_tagged::<u8, Reentry, _>(|v| *v += 1);
        });
    }

    #[test]
    fn thread_local_default_may_use_other_thread_locals() {
        struct Seeded;

        struct SeededFromCounter(u32);

        impl Default for SeededFromCounter {
            fn default() -> Self {
                Self(with_thread_local_tagged::<u32, Seeded, _>(|counter| {
                    *counter += 7;
                    *counter
                }))
            }
        }

        let seed = with_thread_local_tagged::<SeededFromCounter, Seeded, _>(|s| s.0);
        assert_eq!(seed, 7);
        assert_eq!(with_thread_local_tagged::<u32, Seeded, _>(|counter| *counter), 7);
        // Built once; the second access does not bump the counter again.
        assert_eq!(with_thread_local_tagged::<SeededFromCounter, Seeded, _>(|s| s.0), 7);
        assert_eq!(with_thread_local_tagged::<u32, Seeded, _>(|counter| *counter), 7);
    }

    #[test]
    fn unique_singleton_lazily_creates_value() {
        let mut handle = unique_tagged::<Vec<String>, UniqueTest>();
        assert!(handle.has_lock());
        assert!(!handle.has_value().unwrap());

        handle.value_mut().unwrap().push("first".into());
        assert!(handle.has_value().unwrap());
        drop(handle);

        let mut again = unique_tagged::<Vec<String>, UniqueTest>();
        assert_eq!(again.value().unwrap(), &vec!["first".to_string()]);
    }

    #[test]
    fn unique_singleton_blocks_second_holder() {
        let handle = unique_tagged::<u8, UniqueTest>();
        let acquired = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&acquired);

        let waiter = thread::spawn(move || {
            let _second = unique_tagged::<u8, UniqueTest>();
            flag.store(1, Ordering::SeqCst);
        });

        thread::sleep(std::time::Duration::from_millis(30));
        assert_eq!(acquired.load(Ordering::SeqCst), 0, "second handle must wait");
        drop(handle);
        waiter.join().unwrap();
        assert_eq!(acquired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unique_singleton_reset_and_release() {
        let mut handle = unique_tagged::<u32, UniqueResetTest>();
        *handle.value_mut().unwrap() = 9;
        handle.reset().unwrap();
        assert_eq!(*handle.value().unwrap(), 0);

        handle.release_lock();
        assert!(!handle.has_lock());
        assert!(matches!(handle.value(), Err(SyncError::LockReleased)));
        assert!(matches!(handle.reset(), Err(SyncError::LockReleased)));
    }
}
