// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Closable, many-listener broadcast stream.
//!
//! A [`Stream`] fans every emitted value out to all of its listeners and runs a
//! list of close-listeners exactly once when it is closed.
//!
//! ## Characteristics
//!
//! - **Shared handle**: `Stream` is cheap to clone; all clones address the same
//!   stream, which lives as long as its longest holder.
//! - **Asynchronous delivery**: `emit` and `close` only enqueue. A dedicated
//!   worker thread per stream invokes the listeners.
//! - **FIFO**: values are delivered in the order their `emit` calls were
//!   accepted, and a close is delivered after every value accepted before it.
//! - **One-way lifecycle**: once closed, a stream never reopens and rejects
//!   further emissions with [`CascadeError::StreamClosed`].
//! - **Late registration**: a listener added after the close has been
//!   delivered is dropped, since it could never fire; a late close-listener runs
//!   immediately on the registering thread.
//! - **Self-closing**: releasing the last handle of an open stream closes it.
//!
//! Listeners must not block on the stream that is invoking them (for example by
//! calling [`Stream::wait`] from one of its own listeners): the worker would be
//! waiting on itself.
//!
//! ## Example
//!
//! ```
//! use cascade_core::Stream;
//! use std::sync::{Arc, Mutex};
//!
//! # fn main() -> cascade_core::Result<()> {
//! let numbers = Stream::<i32>::named("numbers");
//! let evens = numbers.filter(|n| n % 2 == 0);
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! evens.add_listener(move |n| sink.lock().unwrap().push(*n));
//!
//! numbers.emit(1)?.emit(2)?.emit(3)?.emit(4)?;
//! numbers.close();
//! evens.wait();
//!
//! assert_eq!(*seen.lock().unwrap(), [2, 4]);
//! # Ok(())
//! # }
//! ```

mod combinators;
mod delivery;

use crate::cancellation_token::Cancelled;
use async_channel::Sender;
use cascade_error::{CascadeError, Result};
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use delivery::{spawn_worker, CloseListener, Delivery, Listener, Shared};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    Worker,
    InPlaceIfIdle,
}

/// A closable broadcast channel of `T` values.
///
/// See the [module documentation](self) for the delivery model.
pub struct Stream<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    shared: Arc<Shared<T>>,
    closed: AtomicBool,
    /// Producer side of the worker queue; `None` until the worker is started
    /// and again once the close has been queued.
    queue: Mutex<Option<Sender<Delivery<T>>>>,
}

impl<T: Send + 'static> Inner<T> {
    fn sender<'a>(
        &self,
        queue: &'a mut Option<Sender<Delivery<T>>>,
    ) -> Result<&'a Sender<Delivery<T>>> {
        if queue.is_none() {
            *queue = Some(spawn_worker(Arc::clone(&self.shared))?);
        }
        queue.as_ref().ok_or(CascadeError::StreamClosed)
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        debug!("stream `{}`: last handle released while open", self.shared.name);
        match self.queue.get_mut().take() {
            // Dropping the sender ends the worker's queue; it then delivers the close
            Some(sender) => drop(sender),
            None => self.shared.deliver_close(),
        }
    }
}

impl<T: Send + 'static> Stream<T> {
    /// Creates an open stream with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::named("stream")
    }

    /// Creates an open stream whose worker thread and log records carry `name`.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                shared: Arc::new(Shared::new(name.into())),
                closed: AtomicBool::new(false),
                queue: Mutex::new(None),
            }),
        }
    }

    /// The name given at construction.
    pub fn name(&self) -> &str {
        &self.inner.shared.name
    }

    /// Registers a listener invoked once per delivered value.
    ///
    /// Listeners run in registration order on the stream's worker thread.
    /// Registering on a closed stream succeeds but the listener never fires.
    pub fn add_listener<F>(&self, listener: F) -> &Self
    where
        F: FnMut(&T) + Send + 'static,
    {
        let listener = Mutex::new(listener);
        let listener: Listener<T> = Arc::new(move |value: &T| (&mut *listener.lock())(value));

        if self.inner.shared.listeners.append(listener).is_err() {
            trace!("stream `{}`: listener added after close, dropped", self.name());
        }
        self
    }

    /// Alias for [`add_listener`](Self::add_listener).
    pub fn on_value<F>(&self, listener: F) -> &Self
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.add_listener(listener)
    }

    /// Queues `value` for delivery to every listener.
    ///
    /// Returns before the listeners run.
    ///
    /// # Errors
    ///
    /// - [`CascadeError::StreamClosed`] if the stream has been closed; no
    ///   listener observes the value.
    /// - [`CascadeError::SpawnError`] if the delivery worker could not be started.
    pub fn emit(&self, value: T) -> Result<&Self> {
        if self.is_closed() {
            trace!("stream `{}`: emit rejected, stream closed", self.name());
            return Err(CascadeError::StreamClosed);
        }

        let mut queue = self.inner.queue.lock();
        // close() flips the flag under this lock, so the check is final here
        if self.is_closed() {
            return Err(CascadeError::StreamClosed);
        }

        self.inner
            .sender(&mut *queue)?
            .try_send(Delivery::Value(value))
            .map_err(|_| CascadeError::StreamClosed)?;
        Ok(self)
    }

    /// Builds the value from `args` and emits it.
    ///
    /// # Errors
    ///
    /// Same as [`emit`](Self::emit).
    pub fn emit_from<A>(&self, args: A) -> Result<&Self>
    where
        A: Into<T>,
    {
        self.emit(args.into())
    }

    /// Emits every value of `values` in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Same as [`emit`](Self::emit).
    pub fn emit_all<I>(&self, values: I) -> Result<&Self>
    where
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.emit(value)?;
        }
        Ok(self)
    }

    /// Registers a callback invoked exactly once, when the stream closes.
    ///
    /// If the close has already been delivered the callback runs immediately,
    /// on the calling thread.
    pub fn on_close<F>(&self, callback: F) -> &Self
    where
        F: FnOnce() + Send + 'static,
    {
        let callback: CloseListener = Box::new(callback);
        if let Err(callback) = self.inner.shared.close_listeners.append(callback) {
            callback();
        }
        self
    }

    /// Closes the stream. Idempotent.
    ///
    /// The first call queues the close behind every accepted value; the worker
    /// then runs the close-listeners in registration order and releases all
    /// listeners.
    pub fn close(&self) -> &Self {
        self.close_on(Dispatch::Worker)
    }

    /// Closes the stream from a thread that is already delivering on behalf of
    /// someone else. A stream that never emitted has no worker, and its close
    /// is then delivered right here instead of on a freshly started one.
    pub(crate) fn close_in_place(&self) -> &Self {
        self.close_on(Dispatch::InPlaceIfIdle)
    }

    fn close_on(&self, dispatch: Dispatch) -> &Self {
        let mut queue = self.inner.queue.lock();
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return self;
        }

        debug!("stream `{}`: closing", self.name());
        if queue.is_none() && dispatch == Dispatch::InPlaceIfIdle {
            drop(queue);
            self.inner.shared.deliver_close();
            return self;
        }

        let queued = match self.inner.sender(&mut *queue) {
            Ok(sender) => sender.try_send(Delivery::Close).is_ok(),
            Err(err) => {
                warn!("stream `{}`: {}; delivering close inline", self.name(), err);
                false
            }
        };
        *queue = None;
        drop(queue);

        if !queued {
            self.inner.shared.deliver_close();
        }
        self
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    ///
    /// The close may still be in flight; use [`wait`](Self::wait) to observe
    /// its delivery.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Blocks until the stream is closed and the close has been delivered.
    ///
    /// Returns immediately if that already happened.
    pub fn wait(&self) {
        self.inner.shared.delivered.wait();
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`.
    ///
    /// Returns whether the close was delivered in time.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.inner.shared.delivered.wait_timeout(timeout)
    }

    /// Async counterpart of [`wait`](Self::wait).
    pub fn closed(&self) -> Cancelled<'_> {
        self.inner.shared.delivered.cancelled()
    }

    /// Number of registered value listeners.
    ///
    /// Drops to zero once the close has been delivered.
    pub fn listener_count(&self) -> usize {
        self.inner.shared.listeners.len()
    }
}

impl<T: Send + 'static> Default for Stream<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("name", &self.inner.shared.name)
            .field("closed", &self.inner.closed.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
