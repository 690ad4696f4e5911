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

//! Countdown timer and bounded retries.

use std::time::{Duration, Instant};

/// A countdown started at a point in time and running for a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start_time: Instant,
    duration: Duration,
}

impl Timer {
    /// Creates a timer running for `duration`, started now.
    #[inline]
    pub fn new(duration: Duration) -> Self {
        Self {
            start_time: Instant::now(),
            duration,
        }
    }

    /// Restarts the countdown from now.
    #[inline]
    pub fn start(&mut self) {
        self.start_time = Instant::now();
    }

    /// The instant the countdown was last started.
    #[inline]
    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    /// The configured countdown length.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Changes the countdown length without restarting it.
    #[inline]
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Time since the countdown was started.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Elapsed time in whole milliseconds.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Elapsed time in seconds.
    #[inline]
    pub fn elapsed_secs_f64(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Time left before the countdown finishes, zero once it has.
    #[inline]
    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed())
    }

    /// Returns `true` once more than [`duration`](Self::duration) has elapsed.
    #[inline]
    pub fn finished(&self) -> bool {
        self.elapsed() > self.duration
    }

    /// Blocks the current thread until the countdown is over.
    pub fn sleep_until_finished(&self) {
        match self.start_time.checked_add(self.duration) {
            Some(end) => crate::thread::sleep_until(end),
            // The end is past anything an `Instant` can hold.
            None => loop {
                std::thread::sleep(Duration::from_secs(u64::from(u32::MAX)));
            },
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

/// Result of [`invoke_with_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeOutcome {
    /// The operation reported success.
    Good,
    /// The duration ran out before the operation succeeded.
    Timeout,
}

/// Calls `op` until it returns `true` or `duration` has elapsed.
///
/// Failed attempts are spaced `duration / attempts` apart. `op` always runs
/// at least once, even with a zero duration.
pub fn invoke_with_timeout<F>(duration: Duration, mut op: F, attempts: u32) -> InvokeOutcome
where
    F: FnMut() -> bool,
{
    let timer = Timer::new(duration);
    let step = duration / attempts.max(1);
    loop {
        if op() {
            return InvokeOutcome::Good;
        }
        let remaining = timer.remaining();
        if remaining.is_zero() {
            log::debug!("invoke_with_timeout: gave up after {:?}.", timer.elapsed());
            return InvokeOutcome::Timeout;
        }
        std::thread::sleep(step.min(remaining));
    }
}
