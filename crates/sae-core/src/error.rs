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

//! Error type shared by the lookup containers and the request hub.

use thiserror::Error;

/// A specialized `Result` type for `sae-core` operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// An error that can occur within `sae-core`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A lookup was performed with a key that is not present.
    #[error("key not found: {0}")]
    KeyNotFound(String),
    /// The receiver that owned a pending response was dropped before answering.
    #[error("response for request {0} was dropped before it arrived")]
    ResponseDropped(u32),
    /// A pending response did not arrive in time.
    #[error("timed out waiting for response to request {0}")]
    ResponseTimeout(u32),
}

impl CoreError {
    /// Builds a [`CoreError::KeyNotFound`] from any debuggable key.
    pub fn key_not_found<K: std::fmt::Debug + ?Sized>(key: &K) -> Self {
        Self::KeyNotFound(format!("{key:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_not_found_formats_key_with_debug() {
        let err = CoreError::key_not_found("alpha");
        assert_eq!(err.to_string(), "key not found: \"alpha\"");
    }

    #[test]
    fn response_errors_mention_request_id() {
        assert!(CoreError::ResponseDropped(7).to_string().contains('7'));
        assert!(CoreError::ResponseTimeout(9).to_string().contains('9'));
    }
}
