// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Line reader - file contents through a task-owned stream
//!
//! This example demonstrates:
//! - A task whose handler emits the lines of a file
//! - Stopping the task from inside the handler on I/O failures
//! - Filtering and mapping the task's stream into printing consumers
//!
//! Run with: `cargo run -- lines data/lorem.txt` or
//! `cargo run -- numbers data/numbers.txt` (`raw` prints every line as is). Set `RUST_LOG=debug` for the
//! library's diagnostics.

mod console;
mod predicates;
mod reader;

use anyhow::{bail, Context};
use cascade::{CancellationToken, Stream, Task, TaskOutcome};
use predicates::{is_int, is_not_whitespace, to_int};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

enum Mode {
    Raw,
    Lines,
    Numbers,
}

impl Mode {
    fn parse(arg: &str) -> anyhow::Result<Self> {
        match arg {
            "raw" => Ok(Self::Raw),
            "lines" => Ok(Self::Lines),
            "numbers" => Ok(Self::Numbers),
            other => bail!("unknown mode `{other}`, expected `raw`, `lines` or `numbers`"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = env::args().skip(1);
    let usage = "usage: line-reader <raw|lines|numbers> <path>";
    let mode = Mode::parse(&args.next().context(usage)?)?;
    let path = PathBuf::from(args.next().context(usage)?);

    let task = Task::builder()
        .name("line-reader")
        .build(move |ctx, stream| reader::stream_file(&path, ctx, stream));

    let done = match mode {
        Mode::Raw => print_raw(&task.stream()),
        Mode::Lines => print_lines(&task.stream()),
        Mode::Numbers => print_numbers(&task.stream()),
    };

    task.run()?;
    let outcome = task.wait()?;
    done.wait();

    match outcome {
        TaskOutcome::Stopped(stopped) => {
            warn!(reason = %stopped, "reader stopped");
            console::prefixed("stopped: ")(&stopped);
        }
        TaskOutcome::Completed | TaskOutcome::Idle => info!("reader finished"),
    }
    Ok(())
}

/// Cancelled once `stream` has delivered its close, i.e. everything is printed.
fn printed(stream: &Stream<impl Send + 'static>) -> CancellationToken {
    let done = CancellationToken::new();
    let signal = done.clone();
    stream.on_close(move || {
        signal.cancel();
    });
    done
}

fn print_raw(lines: &Stream<String>) -> CancellationToken {
    lines.for_each(console::log());
    printed(lines)
}

fn print_lines(lines: &Stream<String>) -> CancellationToken {
    let shown = lines.filter(is_not_whitespace);
    shown.for_each(console::surrounded("$[> ", " <]$"));
    printed(&shown)
}

fn print_numbers(lines: &Stream<String>) -> CancellationToken {
    let numbers = lines.filter(is_not_whitespace).filter(is_int).map_to(to_int);
    numbers.for_each(console::surrounded("$> ", " <$"));
    printed(&numbers)
}
