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

//! # SAE Terminal
//!
//! A line-oriented command terminal. Each input line is split on spaces and
//! its first token looked up in a command set; the loop runs on its own
//! thread and can be closed by a command, by end of input, or from outside.
//!
//! ```no_run
//! use std::io::{self, BufReader, Write};
//! use sae_terminal::{Terminal, TerminalConfig};
//!
//! let mut terminal = Terminal::builder(TerminalConfig::default())
//!     .builtins()
//!     .command("hello", |session, _args| writeln!(session.out(), "hello!"))
//!     .spawn(BufReader::new(io::stdin()), io::stdout())?;
//! terminal.wait()?;
//! # Ok::<(), sae_terminal::TerminalError>(())
//! ```

#![warn(missing_docs)]

pub mod builtins;
pub mod config;
pub mod error;
pub mod session;
pub mod terminal;

pub use config::TerminalConfig;
pub use error::{TerminalError, TerminalResult};
pub use session::{Command, Session};
pub use terminal::{Terminal, TerminalBuilder};
