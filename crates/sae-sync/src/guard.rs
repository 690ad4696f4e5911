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

//! A value wrapper that serialises access through a mutex.
//!
//! [`ResourceGuard::acquire`] hands back a [`GuardHandle`]; the value stays
//! locked for as long as the handle lives. A panic while a handle is held does
//! not make the value unreachable: the poisoned lock is recovered and the
//! value handed out again, with a warning in the log.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::{Duration, Instant};

use crate::error::{SyncError, SyncResult};

/// How many times [`ResourceGuard::acquire_timeout`] polls within its timeout.
const LOCK_POLL_ATTEMPTS: u32 = 20;

/// A mutex-guarded value.
#[derive(Debug, Default)]
pub struct ResourceGuard<T> {
    inner: Mutex<T>,
}

impl<T> ResourceGuard<T> {
    /// Wraps `value`.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Blocks until the value is free and returns a handle to it.
    pub fn acquire(&self) -> GuardHandle<'_, T> {
        let guard = self.inner.lock().unwrap_or_else(|poisoned| self.recover(poisoned));
        GuardHandle { guard }
    }

    /// Returns a handle if the value is free right now.
    pub fn try_acquire(&self) -> Option<GuardHandle<'_, T>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(GuardHandle { guard }),
            Err(TryLockError::Poisoned(poisoned)) => Some(GuardHandle {
                guard: self.recover(poisoned),
            }),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Polls for the value until `timeout` elapses.
    ///
    /// A timeout too large to represent as a deadline blocks like [`acquire`](Self::acquire).
    pub fn acquire_timeout(&self, timeout: Duration) -> SyncResult<GuardHandle<'_, T>> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Ok(self.acquire());
        };
        let step = timeout / LOCK_POLL_ATTEMPTS;
        loop {
            if let Some(handle) = self.try_acquire() {
                return Ok(handle);
            }
            let now = Instant::now();
            if now >= deadline {
                log::debug!("ResourceGuard: lock not acquired within {timeout:?}.");
                return Err(SyncError::LockTimeout(timeout));
            }
            std::thread::sleep(step.min(deadline - now));
        }
    }

    /// Runs `f` with exclusive access to the value.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.acquire())
    }

    /// Mutable access without locking, available when the guard is not shared.
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands out a poisoned lock's value and clears the poison, so the warning
    /// is logged once per panic.
    fn recover<'a>(&'a self, poisoned: PoisonError<MutexGuard<'a, T>>) -> MutexGuard<'a, T> {
        log::warn!("ResourceGuard: lock was poisoned by a panicking holder; recovering.");
        let guard = poisoned.into_inner();
        self.inner.clear_poison();
        guard
    }

    /// Consumes the guard and returns the value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> From<T> for ResourceGuard<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

/// Scoped access to the value inside a [`ResourceGuard`].
///
/// The lock is released when the handle is dropped.
#[must_use = "the lock is released as soon as the handle is dropped"]
pub struct GuardHandle<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<T> GuardHandle<'_, T> {
    /// Releases the lock. Equivalent to dropping the handle.
    pub fn release(self) {}
}

impl<T> Deref for GuardHandle<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for GuardHandle<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for GuardHandle<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("GuardHandle").field(&*self.guard).finish()
    }
}
