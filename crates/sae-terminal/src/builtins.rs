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

//! Commands every terminal can opt into.

use std::io;
use std::sync::Arc;

use sae_core::CommandSet;

use crate::session::{Command, Session};

/// Clears the screen and homes the cursor.
pub(crate) const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Registers `help`, `exit`, `quit`, `echo` and `clear`, replacing any
/// commands already registered under those names.
pub fn register(commands: &mut CommandSet<Command>) {
    commands.insert("help", Arc::new(help) as Command);
    commands.insert("exit", Arc::new(exit) as Command);
    commands.insert("quit", Arc::new(exit) as Command);
    commands.insert("echo", Arc::new(echo) as Command);
    commands.insert("clear", Arc::new(clear) as Command);
}

fn help(session: &mut Session<'_>, _args: &[&str]) -> io::Result<()> {
    let names = session.command_names();
    let out = session.out();
    writeln!(out, "Available commands:")?;
    for name in names {
        writeln!(out, "  {name}")?;
    }
    Ok(())
}

fn exit(session: &mut Session<'_>, _args: &[&str]) -> io::Result<()> {
    session.close();
    Ok(())
}

fn echo(session: &mut Session<'_>, args: &[&str]) -> io::Result<()> {
    let enabled = match args.get(1).copied() {
        None => !session.echo(),
        Some("on") => true,
        Some("off") => false,
        Some(other) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("expected 'on' or 'off', got '{other}'"),
            ))
        }
    };
    session.set_echo(enabled);
    writeln!(session.out(), "echo {}", if enabled { "on" } else { "off" })
}

fn clear(session: &mut Session<'_>, _args: &[&str]) -> io::Result<()> {
    if session.color() {
        session.out().write_all(CLEAR_SCREEN.as_bytes())?;
    }
    Ok(())
}
