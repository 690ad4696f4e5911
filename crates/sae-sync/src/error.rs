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

//! Error type for guards, singletons and threads.

use std::time::Duration;

use thiserror::Error;

/// A specialized `Result` type for `sae-sync` operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// An error that can occur within `sae-sync`.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A lock could not be acquired before the timeout elapsed.
    #[error("lock not acquired within {0:?}")]
    LockTimeout(Duration),
    /// A thread did not finish before the timeout elapsed.
    #[error("thread did not finish within {0:?}")]
    JoinTimeout(Duration),
    /// The joined thread panicked.
    #[error("thread panicked: {0}")]
    ThreadPanicked(String),
    /// The thread's result was already taken by an earlier join.
    #[error("thread was already joined")]
    AlreadyJoined,
    /// A singleton handle was used after giving its lock back.
    #[error("singleton handle no longer holds its lock")]
    LockReleased,
    /// The OS refused to spawn a thread.
    #[error("failed to spawn thread")]
    Spawn(#[from] std::io::Error),
}

/// Turns a thread's panic payload into a readable message.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
