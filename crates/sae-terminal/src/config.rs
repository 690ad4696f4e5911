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

//! Terminal settings, loadable from a TOML file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{TerminalError, TerminalResult};

/// Settings for a [`Terminal`](crate::Terminal).
///
/// Every field is optional in the file; missing ones take their default.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalConfig {
    /// Printed before each line is read.
    pub prompt: String,
    /// Repeat each token back before dispatching the line.
    pub echo: bool,
    /// Emit ANSI colours for the prompt and error messages.
    pub color: bool,
    /// How often the loop checks whether it was asked to stop while idle.
    pub poll_interval_ms: u64,
    /// How long [`Terminal::shutdown`](crate::Terminal::shutdown) waits for the loop.
    pub shutdown_timeout_ms: u64,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            prompt: "$ ".to_string(),
            echo: false,
            color: true,
            poll_interval_ms: 50,
            shutdown_timeout_ms: 100,
        }
    }
}

impl TerminalConfig {
    /// Loads the config at `path`.
    ///
    /// A missing file yields the defaults. A file that cannot be read or does
    /// not parse is an error.
    pub fn load(path: impl AsRef<Path>) -> TerminalResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No '{}' found. Using default terminal configuration.", path.display());
            return Ok(Self::default());
        }

        log::info!("Found '{}'. Loading terminal configuration.", path.display());
        let text = fs::read_to_string(path).map_err(|err| TerminalError::config(path, err))?;
        Self::parse(&text).map_err(|err| TerminalError::config(path, err))
    }

    /// Parses a config from TOML text.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// [`poll_interval_ms`](Self::poll_interval_ms) as a `Duration`, at least one millisecond.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// [`shutdown_timeout_ms`](Self::shutdown_timeout_ms) as a `Duration`.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
