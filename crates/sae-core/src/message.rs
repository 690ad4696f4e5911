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

//! Request/response correlation.
//!
//! A request is tagged with a [`RequestId`]. Whoever expects the answer
//! registers a [`RequestToken`] with a [`RequestHub`]; when a raw response with
//! the same id shows up, the hub hands it to the token's [`ResponseHandler`]
//! and forgets the token. The [`Receiver`] handler parses the raw message and
//! delivers the result to a [`PendingResponse`] held by the requester.

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// Identifier used to pair requests with their responses.
pub type RequestId = u32;

/// The id that no request ever receives.
pub const NULL_REQUEST: RequestId = 0;

static REQUEST_ID_COUNTER: AtomicU32 = AtomicU32::new(NULL_REQUEST);

/// Hands out a process-wide unique request id. The first id is `1`.
pub fn new_request_id() -> RequestId {
    REQUEST_ID_COUNTER
        .fetch_add(1, Ordering::Relaxed)
        .wrapping_add(1)
}

/// A value tagged with a [`RequestId`].
///
/// Two identifiables compare equal when their ids match, whatever they carry.
#[derive(Debug, Clone)]
pub struct Identifiable<T> {
    /// The request this value belongs to.
    pub id: RequestId,
    /// The carried value.
    pub data: T,
}

impl<T> Identifiable<T> {
    /// Tags `data` with `id`.
    pub fn new(id: RequestId, data: T) -> Self {
        Self { id, data }
    }
}

impl<T, U> PartialEq<Identifiable<U>> for Identifiable<T> {
    fn eq(&self, other: &Identifiable<U>) -> bool {
        self.id == other.id
    }
}

impl<T> PartialEq<RequestId> for Identifiable<T> {
    fn eq(&self, other: &RequestId) -> bool {
        self.id == *other
    }
}

impl<T> Deref for Identifiable<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T> DerefMut for Identifiable<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.data
    }
}

/// A raw response message tagged with the id of the request it answers.
pub type Response<M> = Identifiable<M>;

/// Consumes raw responses routed by a [`RequestHub`].
pub trait ResponseHandler<M>: Send + Sync {
    /// Handles one response.
    fn handle(&self, response: Response<M>);
}

/// Tells the hub which handler receives the response to a request.
pub type RequestToken<M> = Identifiable<Arc<dyn ResponseHandler<M>>>;

/// Turns a raw message into a typed answer.
pub trait ResponseParser<M> {
    /// The parsed answer.
    type Output;
    /// Why a message could not be parsed.
    type Error;

    /// Parses one raw message.
    fn parse(&self, message: &M) -> Result<Self::Output, Self::Error>;
}

type Outcome<P, M> = Result<<P as ResponseParser<M>>::Output, <P as ResponseParser<M>>::Error>;

/// A [`ResponseHandler`] that parses responses and fulfils pending requests.
pub struct Receiver<M, P: ResponseParser<M>> {
    parser: P,
    pending: Mutex<Vec<Identifiable<flume::Sender<Outcome<P, M>>>>>,
    _message: PhantomData<fn(M)>,
}

impl<M, P: ResponseParser<M>> Receiver<M, P> {
    /// Creates a receiver with no pending requests.
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            pending: Mutex::new(Vec::new()),
            _message: PhantomData,
        }
    }

    /// Registers interest in the response to `id`.
    pub fn request(&self, id: RequestId) -> PendingResponse<P::Output, P::Error> {
        let (tx, rx) = flume::bounded(1);
        self.lock_pending().push(Identifiable::new(id, tx));
        PendingResponse { id, rx }
    }

    /// Number of requests still waiting for a response.
    pub fn pending(&self) -> usize {
        self.lock_pending().len()
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Vec<Identifiable<flume::Sender<Outcome<P, M>>>>> {
        self.pending.lock().unwrap_or_else(|poisoned| {
            log::warn!("Receiver pending list was poisoned; recovering.");
            poisoned.into_inner()
        })
    }
}

impl<M, P> ResponseHandler<M> for Receiver<M, P>
where
    P: ResponseParser<M> + Send + Sync,
    P::Output: Send,
    P::Error: Send,
{
    fn handle(&self, response: Response<M>) {
        let slot = {
            let mut pending = self.lock_pending();
            match pending.iter().position(|p| *p == response) {
                Some(index) => pending.swap_remove(index),
                None => {
                    log::debug!("Receiver got response {} nobody asked for.", response.id);
                    return;
                }
            }
        };

        let outcome = self.parser.parse(&response.data);
        if slot.data.send(outcome).is_err() {
            log::trace!("Requester for {} stopped waiting.", response.id);
        }
    }
}

/// The requester's end of a pending request.
///
/// Results are nested: the outer [`CoreResult`] reports transport problems
/// (timeout, dropped receiver), the inner `Result` is what the parser returned.
#[derive(Debug)]
pub struct PendingResponse<T, E> {
    id: RequestId,
    rx: flume::Receiver<Result<T, E>>,
}

impl<T, E> PendingResponse<T, E> {
    /// The request this response belongs to.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Blocks until the response arrives.
    pub fn wait(self) -> CoreResult<Result<T, E>> {
        self.rx
            .recv()
            .map_err(|_| CoreError::ResponseDropped(self.id))
    }

    /// Blocks for at most `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> CoreResult<Result<T, E>> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            flume::RecvTimeoutError::Timeout => CoreError::ResponseTimeout(self.id),
            flume::RecvTimeoutError::Disconnected => CoreError::ResponseDropped(self.id),
        })
    }

    /// Returns the response if it already arrived.
    pub fn try_get(&self) -> Option<CoreResult<Result<T, E>>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(Ok(outcome)),
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => Some(Err(CoreError::ResponseDropped(self.id))),
        }
    }
}

/// Routes responses to the handler registered for their request id.
pub struct RequestHub<M> {
    tokens: Vec<RequestToken<M>>,
}

impl<M> Default for RequestHub<M> {
    fn default() -> Self {
        Self { tokens: Vec::new() }
    }
}

impl<M: 'static> RequestHub<M> {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token and returns its request id.
    pub fn insert(&mut self, token: RequestToken<M>) -> RequestId {
        let id = token.id;
        self.tokens.push(token);
        id
    }

    /// Allocates a fresh id, registers it with `receiver` and with the hub.
    pub fn request<P>(&mut self, receiver: &Arc<Receiver<M, P>>) -> PendingResponse<P::Output, P::Error>
    where
        P: ResponseParser<M> + Send + Sync + 'static,
        P::Output: Send,
        P::Error: Send,
    {
        let id = new_request_id();
        let pending = receiver.request(id);
        let handler: Arc<dyn ResponseHandler<M>> = receiver.clone();
        self.insert(Identifiable::new(id, handler));
        pending
    }

    /// Passes `response` to the matching token's handler.
    ///
    /// Returns `true` if a token matched. A token is consumed by the first
    /// response carrying its id.
    pub fn handle(&mut self, response: Response<M>) -> bool {
        let Some(index) = self.tokens.iter().position(|t| *t == response) else {
            log::debug!("RequestHub: no token for response {}.", response.id);
            return false;
        };
        let token = self.tokens.swap_remove(index);
        token.data.handle(response);
        true
    }

    /// Number of tokens waiting for a response.
    pub fn pending(&self) -> usize {
        self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ParseNumber;

    impl ResponseParser<String> for ParseNumber {
        type Output = i64;
        type Error = std::num::ParseIntError;

        fn parse(&self, message: &String) -> Result<i64, Self::Error> {
            message.trim().parse()
        }
    }

    #[test]
    fn request_ids_are_unique_and_never_null() {
        let a = new_request_id();
        let b = new_request_id();
        assert_ne!(a, NULL_REQUEST);
        assert_ne!(a, b);
    }

    #[test]
    fn identifiables_compare_by_id() {
        let a = Identifiable::new(5, "left");
        let b = Identifiable::new(5, 99u8);
        assert!(a == b);
        assert!(a == 5u32);
        assert!(!(a == 6u32));
    }

    #[test]
    fn receiver_fulfils_matching_request() {
        let receiver = Receiver::new(ParseNumber);
        let pending = receiver.request(10);

        receiver.handle(Identifiable::new(10, " 42 ".to_string()));

        assert_eq!(pending.wait().unwrap().unwrap(), 42);
        assert_eq!(receiver.pending(), 0);
    }

    #[test]
    fn receiver_delivers_parse_errors() {
        let receiver = Receiver::new(ParseNumber);
        let pending = receiver.request(11);
        receiver.handle(Identifiable::new(11, "forty-two".to_string()));
        assert!(pending.wait().unwrap().is_err());
    }

    #[test]
    fn receiver_ignores_unknown_ids() {
        let receiver = Receiver::new(ParseNumber);
        let pending = receiver.request(12);
        receiver.handle(Identifiable::new(13, "1".to_string()));

        assert!(pending.try_get().is_none());
        assert_eq!(receiver.pending(), 1);
    }

    #[test]
    fn dropped_receiver_reports_dropped_response() {
        let receiver = Receiver::new(ParseNumber);
        let pending = receiver.request(14);
        drop(receiver);
        assert_eq!(pending.wait().unwrap_err(), CoreError::ResponseDropped(14));
    }

    #[test]
    fn wait_timeout_expires() {
        let receiver = Receiver::new(ParseNumber);
        let pending = receiver.request(15);
        let err = pending.wait_timeout(Duration::from_millis(10)).unwrap_err();
        assert_eq!(err, CoreError::ResponseTimeout(15));
    }

    #[test]
    fn hub_routes_once_per_token() {
        let receiver = Arc::new(Receiver::new(ParseNumber));
        let mut hub = RequestHub::new();
        let pending = hub.request(&receiver);
        let id = pending.id();

        assert!(hub.handle(Identifiable::new(id, "7".to_string())));
        assert!(!hub.handle(Identifiable::new(id, "8".to_string())));
        assert_eq!(hub.pending(), 0);
        assert_eq!(pending.wait().unwrap().unwrap(), 7);
    }

    #[test]
    fn hub_rejects_unknown_responses() {
        let mut hub: RequestHub<String> = RequestHub::new();
        assert!(!hub.handle(Identifiable::new(NULL_REQUEST, String::new())));
    }
}
