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

//! Sleep helpers and thread handles that clean up after themselves.
//!
//! [`JoiningThread`] joins on drop. [`InterruptibleThread`] additionally hands
//! its body a [`StopToken`] and, on drop, asks it to stop and waits a bounded
//! time before detaching it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{panic_message, SyncError, SyncResult};

/// How long an [`InterruptibleThread`] is given to stop when dropped.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(100);

/// Poll interval used while waiting for a thread to finish.
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Blocks the current thread for `duration`.
#[inline]
pub fn sleep(duration: Duration) {
    thread::sleep(duration);
}

/// Sleeps for `nanos` nanoseconds. Negative or non-finite values do not sleep.
#[inline]
pub fn sleep_ns(nanos: f64) {
    sleep_s(nanos / 1_000_000_000.0);
}

/// Sleeps for `micros` microseconds. Negative or non-finite values do not sleep.
#[inline]
pub fn sleep_us(micros: f64) {
    sleep_s(micros / 1_000_000.0);
}

/// Sleeps for `millis` milliseconds. Negative or non-finite values do not sleep.
#[inline]
pub fn sleep_ms(millis: f64) {
    sleep_s(millis / 1_000.0);
}

/// Sleeps for `secs` seconds. Negative or non-finite values do not sleep.
pub fn sleep_s(secs: f64) {
    if let Ok(duration) = Duration::try_from_secs_f64(secs) {
        thread::sleep(duration);
    }
}

/// Sleeps until `deadline`. Returns immediately if it has already passed.
pub fn sleep_until(deadline: Instant) {
    let now = Instant::now();
    if deadline > now {
        thread::sleep(deadline - now);
    }
}

/// The current instant.
#[inline]
pub fn now() -> Instant {
    Instant::now()
}

fn join_handle<T>(handle: JoinHandle<T>) -> SyncResult<T> {
    handle
        .join()
        .map_err(|payload| SyncError::ThreadPanicked(panic_message(payload)))
}

/// Waits up to `timeout` for `handle` to finish.
///
/// A timeout too large to represent as a deadline waits until it does.
fn finished_within<T>(handle: &JoinHandle<T>, timeout: Duration) -> bool {
    let deadline = Instant::now().checked_add(timeout);
    while !handle.is_finished() {
        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return false;
                }
                JOIN_POLL_INTERVAL.min(deadline - now)
            }
            None => JOIN_POLL_INTERVAL,
        };
        thread::sleep(pause);
    }
    true
}

/// A thread that is joined when its handle goes out of scope.
#[derive(Debug)]
pub struct JoiningThread<T> {
    handle: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> JoiningThread<T> {
    /// Spawns `f` on a new thread.
    pub fn spawn<F>(f: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            handle: Some(thread::spawn(f)),
        }
    }

    /// Spawns `f` on a new thread called `name`.
    pub fn spawn_named<F>(name: impl Into<String>, f: F) -> SyncResult<Self>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let handle = thread::Builder::new().name(name.into()).spawn(f)?;
        Ok(Self {
            handle: Some(handle),
        })
    }
}

impl<T> JoiningThread<T> {
    /// Returns `true` once the thread body has returned (or its result was taken).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Blocks until the thread finishes and returns its result.
    pub fn join(mut self) -> SyncResult<T> {
        let handle = self.handle.take().ok_or(SyncError::AlreadyJoined)?;
        join_handle(handle)
    }

    /// Takes the result if the thread has already finished.
    pub fn try_join(&mut self) -> Option<SyncResult<T>> {
        self.try_join_timeout(Duration::ZERO)
    }

    /// Waits up to `timeout` for the thread and takes its result if it finished.
    ///
    /// Returns `None` if the thread is still running, and
    /// `Some(Err(SyncError::AlreadyJoined))` if the result was taken before.
    pub fn try_join_timeout(&mut self, timeout: Duration) -> Option<SyncResult<T>> {
        let Some(handle) = self.handle.as_ref() else {
            return Some(Err(SyncError::AlreadyJoined));
        };
        if !finished_within(handle, timeout) {
            return None;
        }
        self.handle.take().map(join_handle)
    }
}

impl<T> Drop for JoiningThread<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = join_handle(handle) {
                log::warn!("JoiningThread: {err}");
            }
        }
    }
}

/// Cooperative stop flag shared between an [`InterruptibleThread`] and its body.
#[derive(Debug, Clone)]
pub struct StopToken {
    running: Arc<AtomicBool>,
}

impl StopToken {
    fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Returns `true` until a stop has been requested.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Returns `true` once a stop has been requested.
    #[inline]
    pub fn should_stop(&self) -> bool {
        !self.is_running()
    }

    /// Asks the thread to stop. The body decides when it notices.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

/// A thread whose body polls a [`StopToken`] and can be asked to stop.
///
/// Dropping the handle requests a stop and waits [`DEFAULT_SHUTDOWN_TIMEOUT`].
/// A body that does not return in time is detached.
#[derive(Debug)]
pub struct InterruptibleThread {
    token: StopToken,
    handle: Option<JoinHandle<()>>,
}

impl InterruptibleThread {
    /// Spawns `f`, handing it the thread's stop token.
    pub fn spawn<F>(f: F) -> Self
    where
        F: FnOnce(StopToken) + Send + 'static,
    {
        let token = StopToken::new();
        let body_token = token.clone();
        Self {
            token,
            handle: Some(thread::spawn(move || f(body_token))),
        }
    }

    /// Spawns `f` on a thread called `name`.
    pub fn spawn_named<F>(name: impl Into<String>, f: F) -> SyncResult<Self>
    where
        F: FnOnce(StopToken) + Send + 'static,
    {
        let token = StopToken::new();
        let body_token = token.clone();
        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || f(body_token))?;
        Ok(Self {
            token,
            handle: Some(handle),
        })
    }

    /// Returns `true` while no stop was requested and the body is still running.
    pub fn is_running(&self) -> bool {
        self.token.is_running() && !self.is_finished()
    }

    /// Returns `true` once the body has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// A clone of the token handed to the body.
    pub fn stop_token(&self) -> StopToken {
        self.token.clone()
    }

    /// Asks the body to stop without waiting for it.
    pub fn request_stop(&self) {
        self.token.request_stop();
    }

    /// Blocks until the body returns on its own, without requesting a stop.
    pub fn wait(&mut self) -> SyncResult<()> {
        match self.handle.take() {
            Some(handle) => join_handle(handle),
            None => Ok(()),
        }
    }

    /// Requests a stop and waits up to `timeout` for the body to return.
    ///
    /// Returns `false` if the body is still running afterwards. A panic in
    /// the body counts as finished and is logged.
    pub fn try_shutdown(&mut self, timeout: Duration) -> bool {
        match self.shutdown(timeout) {
            Ok(()) => true,
            Err(SyncError::JoinTimeout(_)) => false,
            Err(err) => {
                log::warn!("InterruptibleThread: {err}");
                true
            }
        }
    }

    /// Requests a stop and waits up to `timeout` for the body to return.
    pub fn shutdown(&mut self, timeout: Duration) -> SyncResult<()> {
        self.request_stop();
        let Some(handle) = self.handle.as_ref() else {
            return Ok(());
        };
        if !finished_within(handle, timeout) {
            return Err(SyncError::JoinTimeout(timeout));
        }
        self.wait()
    }
}

impl Drop for InterruptibleThread {
    fn drop(&mut self) {
        if !self.try_shutdown(DEFAULT_SHUTDOWN_TIMEOUT) {
            log::warn!(
                "InterruptibleThread: body still running after {DEFAULT_SHUTDOWN_TIMEOUT:?}; detaching."
            );
            self.handle = None;
        }
    }
}
