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

//! # SAE Sync
//!
//! Thread-safe primitives built on the standard library's mutexes and threads:
//! a [`ResourceGuard`] that hands out scoped lock handles, a lazily populated
//! singleton table, a blocking [`ThreadQueue`], and thread wrappers that join
//! or shut down on drop.

#![warn(missing_docs)]

pub mod error;
pub mod guard;
pub mod queue;
pub mod scope;
pub mod singleton;
pub mod thread;
pub mod timer;

pub use error::{SyncError, SyncResult};
pub use guard::{GuardHandle, ResourceGuard};
pub use queue::ThreadQueue;
pub use scope::ScopeWatch;
pub use singleton::{
    global, global_tagged, threadsafe, threadsafe_tagged, unique, unique_tagged,
    with_thread_local, with_thread_local_tagged, SingletonTable, ThreadsafeSingleton,
    UniqueSingleton,
};
pub use thread::{InterruptibleThread, JoiningThread, StopToken, DEFAULT_SHUTDOWN_TIMEOUT};
pub use timer::{invoke_with_timeout, InvokeOutcome, Timer};
