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

//! # SAE Core
//!
//! Single-threaded building blocks shared by the other SAE crates: a string
//! tokenizer, bidirectional and insertion-ordered lookup tables, command sets
//! for name-based dispatch, and a hub that routes identified responses back to
//! whoever asked for them.

#![warn(missing_docs)]

pub mod command;
pub mod dualmap;
pub mod error;
pub mod kvector;
pub mod message;
pub mod token;

pub use command::{dispatch_command_line, parse_command_line, CommandCallback, CommandSet};
pub use dualmap::DualMap;
pub use error::{CoreError, CoreResult};
pub use kvector::{Id, IdVector, KeyVector};
pub use message::{
    new_request_id, Identifiable, PendingResponse, Receiver, RequestHub, RequestId, RequestToken,
    Response, ResponseHandler, ResponseParser, NULL_REQUEST,
};
pub use token::{erase_empty, split, split_not_empty, Delimiter, TokenList};
