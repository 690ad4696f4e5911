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

//! What a command sees while it runs.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sae_core::CommandSet;
use sae_sync::ResourceGuard;

/// A terminal command.
///
/// Called with the session and every token of the line, the command name
/// included as the first one.
pub type Command = Arc<dyn Fn(&mut Session<'_>, &[&str]) -> io::Result<()> + Send + Sync>;

/// Flags and commands shared between a [`Terminal`](crate::Terminal) handle
/// and its loop.
pub(crate) struct TerminalState {
    pub(crate) commands: ResourceGuard<CommandSet<Command>>,
    keep_open: AtomicBool,
    echo: AtomicBool,
}

impl TerminalState {
    pub(crate) fn new(commands: CommandSet<Command>, echo: bool) -> Self {
        Self {
            commands: ResourceGuard::new(commands),
            keep_open: AtomicBool::new(true),
            echo: AtomicBool::new(echo),
        }
    }

    pub(crate) fn keep_open(&self) -> bool {
        self.keep_open.load(Ordering::Acquire)
    }

    pub(crate) fn set_close_flag(&self) {
        self.keep_open.store(false, Ordering::Release);
    }

    pub(crate) fn echo(&self) -> bool {
        self.echo.load(Ordering::Relaxed)
    }

    pub(crate) fn set_echo(&self, enabled: bool) {
        self.echo.store(enabled, Ordering::Relaxed);
    }

    pub(crate) fn command_names(&self) -> Vec<String> {
        self.commands
            .acquire()
            .names()
            .into_iter()
            .cloned()
            .collect()
    }
}

/// Handle given to a running command.
///
/// The command list is not locked while a command runs, so a command may
/// list the registered names.
pub struct Session<'a> {
    out: &'a mut dyn Write,
    state: &'a TerminalState,
    color: bool,
}

impl<'a> Session<'a> {
    pub(crate) fn new(out: &'a mut dyn Write, state: &'a TerminalState, color: bool) -> Self {
        Self { out, state, color }
    }

    /// The terminal's output.
    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    /// Asks the terminal to exit after this command.
    pub fn close(&self) {
        self.state.set_close_flag();
    }

    /// Turns token echo on or off.
    pub fn set_echo(&self, enabled: bool) {
        self.state.set_echo(enabled);
    }

    /// Whether tokens are echoed.
    pub fn echo(&self) -> bool {
        self.state.echo()
    }

    /// Whether the terminal emits ANSI colours.
    pub fn color(&self) -> bool {
        self.color
    }

    /// Registered command names, sorted.
    pub fn command_names(&self) -> Vec<String> {
        self.state.command_names()
    }
}
