// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Cascade
//!
//! Closable broadcast streams with a small combinator algebra, and background
//! tasks that own a stream and can be stopped cooperatively.
//!
//! ## Core Concepts
//!
//! - **[`Stream<T>`]**: a cheap-to-clone handle to a broadcast channel. Every
//!   emitted value reaches every listener, in emission order, on the stream's
//!   own delivery thread. A stream closes once and rejects later emissions.
//! - **Combinators**: [`filter`](Stream::filter) and [`map`](Stream::map) derive
//!   new streams that close with their source; [`reduce`](Stream::reduce) and
//!   the `*_match` helpers block until the stream closes.
//! - **[`Task<T>`]**: runs a handler on a background thread against the task's
//!   stream. The handler ends a run early by returning
//!   [`TaskContext::stop_with`]; [`Task::wait`] reports how the run ended.
//!
//! ## Quick Start
//!
//! ```
//! use cascade::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! # fn main() -> cascade::Result<()> {
//! let task = Task::new(|ctx, stream| {
//!     for line in ["10", "", "x", "32"] {
//!         stream.emit(line.to_string())?;
//!     }
//!     Err(ctx.stop_with("end of input"))
//! });
//!
//! let numbers = task
//!     .stream()
//!     .filter(|line| !line.is_empty())
//!     .map(|line| line.parse::<i64>().ok());
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! numbers.for_each(move |n| sink.lock().unwrap().extend(*n));
//!
//! task.run()?;
//! let outcome = task.wait()?;
//! numbers.wait();
//!
//! assert_eq!(outcome.stop_reason(), Some("end of input"));
//! assert_eq!(*seen.lock().unwrap(), [10, 32]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `tracing`: route diagnostics through [`tracing`](https://docs.rs/tracing)
//!   instead of standard error.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

// Re-export core types
pub use cascade_core::{
    make_stream, CancellationToken, Cancelled, Stopped, Stream, Task, TaskBuilder, TaskContext,
    TaskExit, TaskOutcome,
};

// Re-export the error stack
pub use cascade_error::{CascadeError, IntoCascadeError, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        make_stream, CascadeError, Stopped, Stream, Task, TaskBuilder, TaskContext, TaskExit,
        TaskOutcome,
    };
}
