// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::exit::{Stopped, TaskExit};
use crate::{CancellationToken, Stream};
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use parking_lot::Mutex;
use std::sync::Arc;

/// State shared by a [`Task`](super::Task) and every context handed to its handler.
pub(super) struct TaskState<T> {
    pub(super) name: String,
    pub(super) stream: Stream<T>,
    pub(super) running: AtomicBool,
    /// Replaced at the start of every run cycle
    pub(super) stop_token: Mutex<CancellationToken>,
    /// The first stop of the current run cycle
    pub(super) stop_request: Mutex<Option<Stopped>>,
}

/// The handler's view of its task.
///
/// Cheap to clone. A clone can be moved into a listener so that a consumer
/// requests the stop and the handler loop notices it through
/// [`is_stopped`](Self::is_stopped). Only code the handler hands a context to
/// can stop the task; there is no way to preempt it from outside.
pub struct TaskContext<T> {
    state: Arc<TaskState<T>>,
}

impl<T: Send + 'static> TaskContext<T> {
    pub(super) fn new(state: Arc<TaskState<T>>) -> Self {
        Self { state }
    }

    pub(super) fn mark_idle(&self) {
        self.state.running.store(false, Ordering::Release);
    }

    /// Stops the current run with the default reason.
    ///
    /// See [`stop_with`](Self::stop_with).
    #[must_use = "return the signal from the handler to unwind it"]
    pub fn stop(&self) -> TaskExit {
        self.stop_with(Stopped::DEFAULT_REASON)
    }

    /// Stops the current run.
    ///
    /// If the task is running, marks it idle, records `reason`, signals the
    /// stop token and closes the task's stream. Once a run has been stopped,
    /// later calls change nothing and return the signal of the first stop, so
    /// the reason given by whoever stopped the run first is the one reported
    /// by [`Task::wait`](super::Task::wait).
    ///
    /// Either way the returned signal must be returned from the handler
    /// (`return Err(ctx.stop_with(..))`) to unwind it.
    #[must_use = "return the signal from the handler to unwind it"]
    pub fn stop_with(&self, reason: impl Into<String>) -> TaskExit {
        let (stopped, first) = {
            let mut request = self.state.stop_request.lock();
            if self.state.running.swap(false, Ordering::AcqRel) {
                let stopped = Stopped::new(reason);
                *request = Some(stopped.clone());
                (stopped, true)
            } else {
                let stopped = request.clone().unwrap_or_else(|| Stopped::new(reason));
                (stopped, false)
            }
        };

        if first {
            debug!("task `{}`: stopping: {}", self.state.name, stopped);
            self.state.stop_token.lock().cancel();
            self.state.stream.close();
        }

        TaskExit::Stopped(stopped)
    }

    /// The stop recorded for the current run cycle, if any.
    pub(super) fn stop_request(&self) -> Option<Stopped> {
        self.state.stop_request.lock().clone()
    }

    /// Whether a stop has been requested during the current run.
    pub fn is_stopped(&self) -> bool {
        self.state.stop_token.lock().is_cancelled()
    }

    /// Token cancelled when the current run is stopped.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.state.stop_token.lock().clone()
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

impl<T> Clone for TaskContext<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> fmt::Debug for TaskContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("name", &self.state.name)
            .field("running", &self.state.running.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
