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

//! A blocking multi-producer, multi-consumer FIFO.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// A FIFO queue shared between threads.
///
/// Producers [`push`](Self::push); consumers either block in
/// [`next`](Self::next) or poll with [`try_next`](Self::try_next) and
/// [`next_timeout`](Self::next_timeout).
#[derive(Debug)]
pub struct ThreadQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> Default for ThreadQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ThreadQueue<T> {
    /// Creates an empty queue.
    pub const fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `value` and wakes one waiting consumer.
    pub fn push(&self, value: T) {
        self.lock().push_back(value);
        self.available.notify_one();
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Removes the front item, blocking until one is available.
    pub fn next(&self) -> T {
        let mut items = self
            .available
            .wait_while(self.lock(), |items| items.is_empty())
            .unwrap_or_else(PoisonError::into_inner);
        // The wait only returns once the queue is non-empty.
        match items.pop_front() {
            Some(item) => item,
            None => unreachable!("wait_while returned with an empty queue"),
        }
    }

    /// Removes the front item if there is one.
    pub fn try_next(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Removes the front item, waiting at most `timeout` for one to arrive.
    ///
    /// A timeout too large to represent as a deadline blocks like [`next`](Self::next).
    pub fn next_timeout(&self, timeout: Duration) -> Option<T> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.next());
        };
        let mut items = self.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return Some(item);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            items = self
                .available
                .wait_timeout(items, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Drops up to `n` items from the front, returning how many were dropped.
    pub fn ignore(&self, n: usize) -> usize {
        let mut items = self.lock();
        let count = n.min(items.len());
        items.drain(..count);
        count
    }

    /// Drops every queued item.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Removes and returns every queued item in order.
    pub fn drain(&self) -> Vec<T> {
        self.lock().drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fifo_order() {
        let queue = ThreadQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.next(), 1);
        assert_eq!(queue.try_next(), Some(2));
        assert_eq!(queue.drain(), vec![3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn next_blocks_until_pushed() {
        let queue = Arc::new(ThreadQueue::new());
        let producer = Arc::clone(&queue);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.push("late");
        });
        assert_eq!(queue.next(), "late");
        handle.join().unwrap();
    }

    #[test]
    fn next_timeout_on_empty_queue() {
        let queue: ThreadQueue<u8> = ThreadQueue::new();
        let start = Instant::now();
        assert_eq!(queue.next_timeout(Duration::from_millis(20)), None);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn unbounded_timeout_returns_queued_item() {
        let queue = ThreadQueue::new();
        queue.push(1);
        assert_eq!(queue.next_timeout(Duration::MAX), Some(1));
    }

    #[test]
    fn unbounded_timeout_waits_for_producer() {
        let queue = Arc::new(ThreadQueue::new());
        let producer = Arc::clone(&queue);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            producer.push(2);
        });
        assert_eq!(queue.next_timeout(Duration::MAX), Some(2));
        handle.join().unwrap();
    }

    #[test]
    fn ignore_drops_at_most_n() {
        let queue = ThreadQueue::new();
        for i in 0..5 {
            queue.push(i);
        }
        assert_eq!(queue.ignore(2), 2);
        assert_eq!(queue.try_next(), Some(2));
        assert_eq!(queue.ignore(10), 2);
        assert!(queue.is_empty());
        assert_eq!(queue.ignore(1), 0);
    }

    #[test]
    fn clear_empties_queue() {
        let queue = ThreadQueue::new();
        queue.push('a');
        queue.push('b');
        queue.clear();
        assert!(queue.try_next().is_none());
    }

    #[test]
    fn many_producers_one_consumer() {
        let queue = Arc::new(ThreadQueue::new());
        let producers: Vec<_> = (0..4)
            .map(|p| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..100 {
                        queue.push(p * 100 + i);
                    }
                })
            })
            .collect();

        let mut received: Vec<i32> = (0..400).map(|_| queue.next()).collect();
        for producer in producers {
            producer.join().unwrap();
        }
        received.sort_unstable();
        assert_eq!(received, (0..400).collect::<Vec<_>>());
    }
}
