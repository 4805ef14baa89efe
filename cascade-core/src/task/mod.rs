// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Background task owning a stream, with cooperative cancellation.
//!
//! A [`Task`] runs a handler on its own thread and hands it a [`TaskContext`]
//! and the task's [`Stream`]. The handler pushes values into the stream and may
//! end the run early by returning the signal produced by
//! [`TaskContext::stop_with`]. Consumers attach listeners to
//! [`Task::stream`] before or after [`Task::run`].
//!
//! ## Lifecycle
//!
//! - `Idle → Running` on [`run`](Task::run)
//! - `Running → Idle` when the handler returns, stops, fails or panics
//!
//! The stream is closed when the run is stopped or fails. A run that completes
//! normally closes it too unless the task was built with
//! [`close_on_completion(false)`](TaskBuilder::close_on_completion).
//!
//! A stop requested through a [`TaskContext`] clone, typically from a listener,
//! closes the stream while the handler is still producing. Once a stop has been
//! requested the run is reported as stopped, with the first stop's reason,
//! whether the handler then returns the stop signal, returns normally or bails
//! out on the [`CascadeError::StreamClosed`] of its next emit.
//!
//! ## Example
//!
//! ```
//! use cascade_core::Task;
//! use std::sync::{Arc, Mutex};
//!
//! # fn main() -> cascade_core::Result<()> {
//! let task = Task::new(|ctx, stream| {
//!     stream.emit("a".to_string())?;
//!     stream.emit("b".to_string())?;
//!     Err(ctx.stop_with("done"))
//! });
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! task.stream().add_listener(move |letter: &String| sink.lock().unwrap().push(letter.clone()));
//!
//! task.run()?;
//! let outcome = task.wait()?;
//! task.stream().wait();
//!
//! assert_eq!(outcome.stop_reason(), Some("done"));
//! assert_eq!(*seen.lock().unwrap(), ["a", "b"]);
//! # Ok(())
//! # }
//! ```

mod context;
mod exit;

pub use context::TaskContext;
pub use exit::{Stopped, TaskExit};

use crate::unwind::panic_message;
use crate::{CancellationToken, Stream};
use cascade_error::{CascadeError, Result};
use context::TaskState;
use core::fmt;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, Ordering};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Handler<T> =
    Arc<dyn Fn(&TaskContext<T>, &Stream<T>) -> core::result::Result<(), TaskExit> + Send + Sync>;

/// How a run ended, as reported by [`Task::wait`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// There was no run to wait for
    Idle,
    /// The handler returned normally
    Completed,
    /// The handler stopped itself
    Stopped(Stopped),
}

impl TaskOutcome {
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }

    /// The stop reason, for a stopped run.
    pub fn stop_reason(&self) -> Option<&str> {
        match self {
            Self::Stopped(stopped) => Some(stopped.reason()),
            Self::Idle | Self::Completed => None,
        }
    }
}

/// Configures a [`Task`] before construction.
///
/// ```
/// use cascade_core::{Task, TaskBuilder};
///
/// let task: Task<u8> = TaskBuilder::new()
///     .name("sensor")
///     .close_on_completion(false)
///     .build(|_ctx, stream| {
///         stream.emit(7)?;
///         Ok(())
///     });
/// assert_eq!(task.name(), "sensor");
/// ```
pub struct TaskBuilder<T> {
    name: String,
    close_on_completion: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + 'static> TaskBuilder<T> {
    /// Defaults: name `"task"`, close on completion.
    pub fn new() -> Self {
        Self {
            name: "task".to_string(),
            close_on_completion: true,
            _marker: PhantomData,
        }
    }

    /// Names the runner thread, the task's stream and log records.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether a normally completed run closes the stream (default `true`).
    ///
    /// With `false`, closing after a normal return is left to the handler or
    /// to whoever else holds the stream.
    #[must_use]
    pub fn close_on_completion(mut self, close: bool) -> Self {
        self.close_on_completion = close;
        self
    }

    pub fn build<H>(self, handler: H) -> Task<T>
    where
        H: Fn(&TaskContext<T>, &Stream<T>) -> core::result::Result<(), TaskExit>
            + Send
            + Sync
            + 'static,
    {
        let stream = Stream::named(self.name.clone());
        Task {
            state: Arc::new(TaskState {
                name: self.name,
                stream,
                running: AtomicBool::new(false),
                stop_token: Mutex::new(CancellationToken::new()),
                stop_request: Mutex::new(None),
            }),
            handler: Arc::new(handler),
            close_on_completion: self.close_on_completion,
            runner: Mutex::new(None),
        }
    }
}

impl<T: Send + 'static> Default for TaskBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TaskBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskBuilder")
            .field("name", &self.name)
            .field("close_on_completion", &self.close_on_completion)
            .finish()
    }
}

/// A background unit of work that owns one [`Stream`].
///
/// See the [module documentation](self).
pub struct Task<T> {
    state: Arc<TaskState<T>>,
    handler: Handler<T>,
    close_on_completion: bool,
    runner: Mutex<Option<JoinHandle<Result<TaskOutcome>>>>,
}

impl<T: Send + 'static> Task<T> {
    /// Creates an idle task with default settings.
    pub fn new<H>(handler: H) -> Self
    where
        H: Fn(&TaskContext<T>, &Stream<T>) -> core::result::Result<(), TaskExit>
            + Send
            + Sync
            + 'static,
    {
        TaskBuilder::new().build(handler)
    }

    #[must_use]
    pub fn builder() -> TaskBuilder<T> {
        TaskBuilder::new()
    }

    /// Starts the handler on a background thread. No-op while running.
    ///
    /// A stopped run whose handler has not returned yet still counts as
    /// running here, even though [`is_running`](Self::is_running) already
    /// reports `false`. A finished run that nobody waited for is reaped first;
    /// its failure, if any, is logged and discarded.
    ///
    /// # Errors
    ///
    /// [`CascadeError::SpawnError`] if the runner thread could not be started;
    /// the task stays idle.
    pub fn run(&self) -> Result<&Self> {
        let mut runner = self.runner.lock();
        let unwinding = runner.as_ref().is_some_and(|handle| !handle.is_finished());
        if self.is_running() || unwinding {
            return Ok(self);
        }

        if let Some(previous) = runner.take() {
            if let Err(err) = join(previous) {
                warn!("task `{}`: discarding unobserved failure: {}", self.name(), err);
            }
        }

        *self.state.stop_token.lock() = CancellationToken::new();
        *self.state.stop_request.lock() = None;
        self.state.running.store(true, Ordering::Release);

        let context = TaskContext::new(Arc::clone(&self.state));
        let handler = Arc::clone(&self.handler);
        let close_on_completion = self.close_on_completion;

        let spawned = thread::Builder::new()
            .name(self.state.name.clone())
            .spawn(move || execute(&context, &handler, close_on_completion));

        match spawned {
            Ok(handle) => {
                debug!("task `{}`: started", self.name());
                *runner = Some(handle);
                Ok(self)
            }
            Err(err) => {
                self.state.running.store(false, Ordering::Release);
                Err(CascadeError::spawn_error("task runner", err))
            }
        }
    }

    /// Blocks until the current run finishes and leaves the task idle.
    ///
    /// Returns [`TaskOutcome::Idle`] at once when there is no run to wait for.
    ///
    /// # Errors
    ///
    /// The handler's failure, unchanged: the error it returned, or
    /// [`CascadeError::HandlerPanic`] if it panicked.
    pub fn wait(&self) -> Result<TaskOutcome> {
        let mut runner = self.runner.lock();
        let outcome = match runner.take() {
            Some(handle) => join(handle),
            None => Ok(TaskOutcome::Idle),
        };
        self.state.running.store(false, Ordering::Release);
        outcome
    }

    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Shared handle to the task's stream.
    pub fn stream(&self) -> Stream<T> {
        self.state.stream.clone()
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.state.name)
            .field("running", &self.state.running.load(Ordering::Acquire))
            .field("close_on_completion", &self.close_on_completion)
            .finish_non_exhaustive()
    }
}

fn join(handle: JoinHandle<Result<TaskOutcome>>) -> Result<TaskOutcome> {
    handle
        .join()
        .unwrap_or_else(|payload| Err(CascadeError::handler_panic(panic_message(&*payload))))
}

fn execute<T: Send + 'static>(
    context: &TaskContext<T>,
    handler: &Handler<T>,
    close_on_completion: bool,
) -> Result<TaskOutcome> {
    let stream = context.stream();
    let result = catch_unwind(AssertUnwindSafe(|| handler(context, &stream)));
    let requested = context.stop_request();

    let outcome = match result {
        // A stop from outside the handler closed the stream under its feet;
        // bailing out on the rejected emit, or returning, is how it complies
        Ok(Ok(()) | Err(TaskExit::Failed(CascadeError::StreamClosed))) if requested.is_some() => {
            let stopped = requested.unwrap_or_default();
            debug!("task `{}`: stopped: {}", context.name(), stopped);
            Ok(TaskOutcome::Stopped(stopped))
        }
        Ok(Ok(())) => {
            debug!("task `{}`: completed", context.name());
            if close_on_completion {
                stream.close();
            }
            Ok(TaskOutcome::Completed)
        }
        Ok(Err(TaskExit::Stopped(stopped))) => {
            let stopped = requested.unwrap_or(stopped);
            debug!("task `{}`: stopped: {}", context.name(), stopped);
            // A hand-built Stopped skips stop_with(); close here as well
            stream.close();
            Ok(TaskOutcome::Stopped(stopped))
        }
        Ok(Err(TaskExit::Failed(err))) => {
            warn!("task `{}`: failed: {}", context.name(), err);
            stream.close();
            Err(err)
        }
        Err(payload) => {
            let message = panic_message(&*payload);
            warn!("task `{}`: panicked: {}", context.name(), message);
            stream.close();
            Err(CascadeError::handler_panic(message))
        }
    };

    context.mark_idle();
    outcome
}
