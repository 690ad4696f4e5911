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

//! The terminal loop and its handle.
//!
//! Input is read on a detached thread and forwarded line by line over a
//! channel, so the loop itself never blocks on the reader: while idle it
//! wakes every poll interval to check its stop token and close flag.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use sae_core::{split_not_empty, CommandSet};
use sae_sync::{InterruptibleThread, StopToken};

use crate::builtins;
use crate::config::TerminalConfig;
use crate::error::TerminalResult;
use crate::session::{Command, Session, TerminalState};

// ANSI color codes
const RESET: &str = "\x1b[0m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";

type Line = io::Result<String>;

/// Collects commands before the terminal starts.
pub struct TerminalBuilder {
    config: TerminalConfig,
    commands: CommandSet<Command>,
}

impl TerminalBuilder {
    /// Registers `command` under `name`.
    pub fn command<F>(mut self, name: impl Into<String>, command: F) -> Self
    where
        F: Fn(&mut Session<'_>, &[&str]) -> io::Result<()> + Send + Sync + 'static,
    {
        self.commands.insert(name, Arc::new(command) as Command);
        self
    }

    /// Registers the built-in commands (`help`, `exit`, `quit`, `echo`, `clear`).
    pub fn builtins(mut self) -> Self {
        builtins::register(&mut self.commands);
        self
    }

    /// Starts reading lines from `input` and writing to `output`.
    pub fn spawn<R, W>(self, input: R, output: W) -> TerminalResult<Terminal>
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
    {
        let state = Arc::new(TerminalState::new(self.commands, self.config.echo));
        let lines = spawn_reader(input)?;
        let shutdown_timeout = self.config.shutdown_timeout();

        let mut runner = Runner {
            state: Arc::clone(&state),
            prompt: self.config.prompt.clone(),
            color: self.config.color,
            poll_interval: self.config.poll_interval(),
            out: Box::new(output),
        };
        let thread = InterruptibleThread::spawn_named("sae-terminal", move |token| {
            runner.run(&lines, &token);
        })?;

        Ok(Terminal {
            state,
            thread,
            shutdown_timeout,
        })
    }
}

/// A running terminal.
///
/// Dropping it closes the terminal and waits up to the configured shutdown
/// timeout for the loop to exit.
pub struct Terminal {
    state: Arc<TerminalState>,
    thread: InterruptibleThread,
    shutdown_timeout: Duration,
}

impl Terminal {
    /// Starts configuring a terminal.
    pub fn builder(config: TerminalConfig) -> TerminalBuilder {
        TerminalBuilder {
            config,
            commands: CommandSet::new(),
        }
    }

    /// Registers `command` under `name`, returning the command it replaced.
    pub fn insert<F>(&self, name: impl Into<String>, command: F) -> Option<Command>
    where
        F: Fn(&mut Session<'_>, &[&str]) -> io::Result<()> + Send + Sync + 'static,
    {
        self.state
            .commands
            .acquire()
            .insert(name, Arc::new(command) as Command)
    }

    /// Unregisters `name`. Returns `true` if it was registered.
    pub fn remove(&self, name: &str) -> bool {
        self.state.commands.acquire().erase(name).is_some()
    }

    /// Returns `true` if a command is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.state.commands.acquire().contains(name)
    }

    /// Asks the loop to exit once the current line is done.
    pub fn set_close_flag(&self) {
        self.state.set_close_flag();
    }

    /// Returns `true` while the loop is running and has not been asked to close.
    pub fn keep_open(&self) -> bool {
        self.state.keep_open() && !self.thread.is_finished()
    }

    /// Turns token echo on or off.
    pub fn set_echo(&self, enabled: bool) {
        self.state.set_echo(enabled);
    }

    /// Whether tokens are echoed.
    pub fn echo(&self) -> bool {
        self.state.echo()
    }

    /// Blocks until the loop exits on its own (a closing command or end of input).
    pub fn wait(&mut self) -> TerminalResult<()> {
        self.thread.wait()?;
        Ok(())
    }

    /// Closes the terminal and waits for the loop.
    ///
    /// Returns `false` if the loop was still running after the shutdown timeout.
    pub fn shutdown(&mut self) -> bool {
        self.set_close_flag();
        self.thread.try_shutdown(self.shutdown_timeout)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_reader<R>(input: R) -> io::Result<flume::Receiver<Line>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = flume::unbounded();
    // Detached: a blocking read on stdin cannot be interrupted.
    thread::Builder::new()
        .name("sae-terminal-input".to_string())
        .spawn(move || {
            for line in input.lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
            log::debug!("Terminal input closed.");
        })?;
    Ok(rx)
}

struct Runner {
    state: Arc<TerminalState>,
    prompt: String,
    color: bool,
    poll_interval: Duration,
    out: Box<dyn Write + Send>,
}

impl Runner {
    fn run(&mut self, lines: &flume::Receiver<Line>, token: &StopToken) {
        log::info!("Terminal started.");
        if let Err(err) = self.serve(lines, token) {
            log::error!("Terminal stopped on I/O error: {err}");
        }
        if let Err(err) = self
            .out
            .write_all(b"Exiting terminal...\n")
            .and_then(|()| self.out.flush())
        {
            log::warn!("Failed to write terminal exit message: {err}");
        }
        log::info!("Terminal exited.");
    }

    fn serve(&mut self, lines: &flume::Receiver<Line>, token: &StopToken) -> io::Result<()> {
        while self.is_open(token) {
            paint(&mut *self.out, self.color, GREEN, &self.prompt)?;
            self.out.flush()?;
            let Some(line) = self.next_line(lines, token)? else {
                break;
            };
            self.handle(&line)?;
        }
        Ok(())
    }

    fn is_open(&self, token: &StopToken) -> bool {
        token.is_running() && self.state.keep_open()
    }

    fn next_line(
        &self,
        lines: &flume::Receiver<Line>,
        token: &StopToken,
    ) -> io::Result<Option<String>> {
        while self.is_open(token) {
            match lines.recv_timeout(self.poll_interval) {
                Ok(line) => return line.map(Some),
                Err(flume::RecvTimeoutError::Timeout) => continue,
                Err(flume::RecvTimeoutError::Disconnected) => return Ok(None),
            }
        }
        Ok(None)
    }

    fn handle(&mut self, line: &str) -> io::Result<()> {
        let tokens = split_not_empty(line, ' ');
        if self.state.echo() {
            for token in &tokens {
                writeln!(self.out, "  {token}")?;
            }
        }

        let command = tokens
            .first()
            .and_then(|name| self.state.commands.acquire().invoke_with(*name, Arc::clone));

        match command {
            Some(command) => {
                let result = {
                    let mut session = Session::new(&mut *self.out, &self.state, self.color);
                    command(&mut session, &tokens)
                };
                if let Err(err) = result {
                    log::warn!("Command '{}' failed: {err}", tokens[0]);
                    paint(&mut *self.out, self.color, RED, &format!("Error: {err}\n"))?;
                }
                self.out.write_all(b"\n")?;
            }
            None => {
                log::debug!("Unrecognized command line {line:?}.");
                let message = format!("Unrecognized command \"{line}\"\n\n");
                paint(&mut *self.out, self.color, RED, &message)?;
            }
        }
        self.out.flush()
    }
}

fn paint(out: &mut dyn Write, enabled: bool, color: &str, text: &str) -> io::Result<()> {
    if enabled {
        write!(out, "{color}{text}{RESET}")
    } else {
        out.write_all(text.as_bytes())
    }
}
