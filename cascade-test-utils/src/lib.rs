// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the Cascade stream library.
//!
//! Streams deliver on their own worker thread, so tests cannot inspect what a
//! listener saw right after `emit` returns. The helpers here record deliveries
//! and block (or await) until a stream's close has been delivered, after which
//! every recorded value is final.
//!
//! # Key Types
//!
//! ## `Recorder<T>`
//!
//! Captures every value a stream delivers:
//!
//! ```rust
//! use cascade_core::Stream;
//! use cascade_test_utils::Recorder;
//!
//! let stream = Stream::<i32>::new();
//! let recorder = Recorder::attach(&stream);
//!
//! stream.emit(1).unwrap().emit(2).unwrap();
//! stream.close();
//! stream.wait();
//!
//! assert_eq!(recorder.values(), vec![1, 2]);
//! ```
//!
//! ## Fixtures
//!
//! - `sample_lines` - text lines mixing words, integers and blank lines
//! - `sample_numbers` - the integers hidden in `sample_lines`, in order
//!
//! # Module Organization
//!
//! - `recorder` - `Recorder<T>`
//! - `helpers` - blocking and async assertion helpers
//! - `test_data` - fixtures
//! - `test_error` - an error type for handlers that fail on purpose

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod helpers;
pub mod recorder;
pub mod test_data;
pub mod test_error;

// Re-export commonly used test utilities
pub use helpers::{
    assert_closes_within, assert_closes_within_async, collect_until_closed, spawn_when_listened,
};
pub use recorder::Recorder;
pub use test_data::{sample_lines, sample_numbers};
pub use test_error::TestError;
