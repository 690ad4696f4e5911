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

//! Error type for the terminal.

use std::path::PathBuf;

use sae_sync::SyncError;
use thiserror::Error;

/// A specialized `Result` type for terminal operations.
pub type TerminalResult<T> = Result<T, TerminalError>;

/// An error that can occur while configuring or running a terminal.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// The config file exists but could not be read or parsed.
    #[error("invalid terminal config '{}'", path.display())]
    Config {
        /// The file that was being loaded.
        path: PathBuf,
        /// What went wrong.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Reading input or writing output failed.
    #[error("terminal I/O failed")]
    Io(#[from] std::io::Error),
    /// The terminal's threads could not be started or joined.
    #[error(transparent)]
    Thread(#[from] SyncError),
}

impl TerminalError {
    pub(crate) fn config(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Config {
            path: path.into(),
            source: source.into(),
        }
    }
}
