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

use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use sae_core::split;
use sae_sync::Timer;
use sae_terminal::{Session, Terminal, TerminalConfig};

/// Interactive SAE command terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Terminal config file. Defaults apply when it does not exist.
    #[arg(short, long, default_value = "terminal.toml")]
    config: PathBuf,
    /// Echo each token before running the line.
    #[arg(long)]
    echo: bool,
    /// Disable ANSI colours.
    #[arg(long)]
    no_color: bool,
    /// Override the prompt.
    #[arg(long)]
    prompt: Option<String>,
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = TerminalConfig::load(&args.config)
        .with_context(|| format!("Failed to load '{}'", args.config.display()))?;
    if args.echo {
        config.echo = true;
    }
    if args.no_color {
        config.color = false;
    }
    if let Some(prompt) = args.prompt {
        config.prompt = prompt;
    }

    let mut terminal = Terminal::builder(config)
        .builtins()
        .command("split", split_command)
        .command("wait", wait_command)
        .spawn(BufReader::new(io::stdin()), io::stdout())
        .context("Failed to start terminal")?;

    terminal.wait().context("Terminal loop failed")?;
    Ok(())
}

/// `split <delimiter> <text...>`: prints each piece of the text.
fn split_command(session: &mut Session<'_>, args: &[&str]) -> io::Result<()> {
    let [_, delimiter, words @ ..] = args else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "usage: split <delimiter> <text...>",
        ));
    };
    let text = words.join(" ");
    for piece in split(&text, *delimiter) {
        writeln!(session.out(), "[{piece}]")?;
    }
    Ok(())
}

/// `wait <ms>`: sleeps and reports how long it took.
fn wait_command(session: &mut Session<'_>, args: &[&str]) -> io::Result<()> {
    let millis = args
        .get(1)
        .and_then(|ms| ms.parse::<u64>().ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "usage: wait <ms>"))?;
    let timer = Timer::new(Duration::from_millis(millis));
    timer.sleep_until_finished();
    writeln!(session.out(), "waited {} ms", timer.elapsed_ms())
}
