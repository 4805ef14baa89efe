// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cascade_error::{CascadeError, IntoCascadeError};
use core::fmt;

/// Cancellation signal carried out of a stopped handler.
///
/// Not an error: a stopped run is reported by [`Task::wait`](super::Task::wait)
/// as [`TaskOutcome::Stopped`](super::TaskOutcome::Stopped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stopped {
    reason: String,
}

impl Stopped {
    /// Reason used by a bare [`TaskContext::stop`](super::TaskContext::stop).
    pub const DEFAULT_REASON: &'static str = "stopping task";

    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Default for Stopped {
    fn default() -> Self {
        Self::new(Self::DEFAULT_REASON)
    }
}

impl fmt::Display for Stopped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Early exit from a task handler.
///
/// Handlers return `Result<(), TaskExit>`. `?` converts any error into
/// [`TaskExit::Failed`], keeping a [`CascadeError`] as is and wrapping anything
/// else in [`CascadeError::HandlerFailure`]; [`TaskContext::stop`](super::TaskContext::stop)
/// produces [`TaskExit::Stopped`].
///
/// ```
/// use cascade_core::{Stream, Task, TaskContext, TaskExit};
///
/// fn parse(ctx: &TaskContext<u32>, stream: &Stream<u32>) -> Result<(), TaskExit> {
///     let value: u32 = "42".parse()?;
///     stream.emit(value)?;
///     Err(ctx.stop_with("done"))
/// }
///
/// let task = Task::new(parse);
/// ```
#[derive(Debug)]
pub enum TaskExit {
    /// The handler asked to stop
    Stopped(Stopped),
    /// The handler failed
    Failed(CascadeError),
}

impl TaskExit {
    /// Whether this exit is a requested stop rather than a failure.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }
}

impl From<Stopped> for TaskExit {
    fn from(stopped: Stopped) -> Self {
        Self::Stopped(stopped)
    }
}

impl<E> From<E> for TaskExit
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::Failed(error.into_cascade())
    }
}
