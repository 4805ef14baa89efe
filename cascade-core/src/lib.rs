// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core building blocks of Cascade: closable broadcast [`Stream`]s with a small
//! combinator algebra, and background [`Task`]s that own a stream and can be
//! stopped cooperatively.
//!
//! Enable the `tracing` feature to route the crate's diagnostics through
//! [`tracing`](https://docs.rs/tracing).

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

pub mod cancellation_token;
pub mod factory;
mod registry;
pub mod stream;
pub mod task;
mod unwind;

pub use self::cancellation_token::{CancellationToken, Cancelled};
pub use self::factory::make_stream;
pub use self::stream::Stream;
pub use self::task::{Stopped, Task, TaskBuilder, TaskContext, TaskExit, TaskOutcome};
pub use cascade_error::{CascadeError, IntoCascadeError, Result};
