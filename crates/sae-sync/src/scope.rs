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

//! Run-once teardown tied to a scope.

/// Runs its teardown closure exactly once: on [`release`](Self::release) or on drop.
///
/// Moving a `ScopeWatch` moves the obligation with it.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use sae_sync::ScopeWatch;
///
/// let closed = Cell::new(false);
/// {
///     let _watch = ScopeWatch::new(|| closed.set(true));
/// }
/// assert!(closed.get());
/// ```
#[must_use = "dropping a ScopeWatch immediately runs its teardown"]
pub struct ScopeWatch<F: FnOnce()> {
    teardown: Option<F>,
}

impl<F: FnOnce()> ScopeWatch<F> {
    /// Arms a watch that will run `teardown`.
    pub fn new(teardown: F) -> Self {
        Self {
            teardown: Some(teardown),
        }
    }

    /// Returns `true` while the teardown has not run yet.
    pub fn is_armed(&self) -> bool {
        self.teardown.is_some()
    }

    /// Runs the teardown now. Later calls and the eventual drop do nothing.
    pub fn release(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }

    /// Forgets the teardown without running it.
    pub fn disarm(&mut self) {
        self.teardown = None;
    }
}

impl<F: FnOnce()> Drop for ScopeWatch<F> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<F: FnOnce()> std::fmt::Debug for ScopeWatch<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeWatch")
            .field("armed", &self.is_armed())
            .finish()
    }
}
