// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the Cascade stream and task toolkit
//!
//! This crate defines the root [`CascadeError`] type shared by streams and tasks.
//! Stream-level failures are local to the call that triggered them; task-level
//! failures are deferred and surface when the task is waited on.
//!
//! Stopping a task is *not* an error: it is reported as an outcome by the task
//! itself, so nothing in this crate models cancellation.
//!
//! # Examples
//!
//! ```
//! use cascade_error::{CascadeError, Result};
//!
//! fn push(open: bool) -> Result<()> {
//!     if open {
//!         Ok(())
//!     } else {
//!         Err(CascadeError::StreamClosed)
//!     }
//! }
//!
//! assert!(push(false).unwrap_err().is_recoverable());
//! ```

/// Root error type for all Cascade operations
#[derive(Debug, thiserror::Error)]
pub enum CascadeError {
    /// A value was emitted into a stream that had already been closed
    ///
    /// The rejected value is dropped and no listener observes it. The stream
    /// itself is unaffected, so callers can simply stop emitting.
    #[error("Cannot emit a new value, the stream has already been closed")]
    StreamClosed,

    /// A task handler returned an error
    ///
    /// The original error is kept as the source so that callers of `wait`
    /// can downcast it back to its concrete type.
    #[error("Task handler failed: {0}")]
    HandlerFailure(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A task handler panicked
    #[error("Task handler panicked: {context}")]
    HandlerPanic {
        /// The panic message, when it could be recovered
        context: String,
    },

    /// A user callback (reducer, predicate) panicked and its result was lost
    #[error("User callback panicked: {context}")]
    CallbackPanic {
        /// Which callback panicked
        context: String,
    },

    /// The operating system refused to start a background thread
    #[error("Failed to spawn {context}: {source}")]
    SpawnError {
        /// What was being spawned
        context: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl CascadeError {
    /// Wrap an error returned by a task handler
    pub fn handler_failure(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::HandlerFailure(Box::new(error))
    }

    /// Create a handler panic error with the given context
    pub fn handler_panic(context: impl Into<String>) -> Self {
        Self::HandlerPanic {
            context: context.into(),
        }
    }

    /// Create a callback panic error with the given context
    pub fn callback_panic(context: impl Into<String>) -> Self {
        Self::CallbackPanic {
            context: context.into(),
        }
    }

    /// Create a spawn error for the given thread description
    pub fn spawn_error(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::SpawnError {
            context: context.into(),
            source,
        }
    }

    /// Check if this is a recoverable error
    ///
    /// A closed stream only rejects the offending call; everything else means
    /// a run or a computation has been lost.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::StreamClosed)
    }

    /// Check if this error was caused by a panic in user code
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::HandlerPanic { .. } | Self::CallbackPanic { .. })
    }
}

/// Specialized Result type for Cascade operations
pub type Result<T> = std::result::Result<T, CascadeError>;

/// Extension trait for converting user errors into `CascadeError`
///
/// Implemented for every `std::error::Error + Send + Sync + 'static`, so a
/// handler can turn any failure into a task failure with `.into_cascade()`.
/// A `CascadeError` converts to itself; anything else is wrapped in
/// [`CascadeError::HandlerFailure`].
pub trait IntoCascadeError {
    /// Convert this error into a `CascadeError`
    fn into_cascade(self) -> CascadeError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoCascadeError for E {
    fn into_cascade(self) -> CascadeError {
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(self);
        match boxed.downcast::<CascadeError>() {
            Ok(cascade) => *cascade,
            Err(other) => CascadeError::HandlerFailure(other),
        }
    }
}
