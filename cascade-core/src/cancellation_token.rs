// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! One-shot latch shared between threads.
//!
//! A [`CancellationToken`] flips from "pending" to "cancelled" exactly once.
//! Threads can block on it with [`wait`](CancellationToken::wait) and async code
//! can await [`cancelled`](CancellationToken::cancelled); both return as soon as
//! the flag is set, and immediately if it already was.
//!
//! Tasks hand one to their handler to request a cooperative stop, and streams use
//! one internally to signal that their close has been delivered.

use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::{Context, Poll};
use event_listener::{Event, EventListener, Listener};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cloneable one-shot cancellation flag with blocking and async waiters.
///
/// # Example
///
/// ```
/// use cascade_core::CancellationToken;
/// use std::thread;
///
/// let token = CancellationToken::new();
/// let waiter = {
///     let token = token.clone();
///     thread::spawn(move || token.wait())
/// };
///
/// assert!(token.cancel());
/// waiter.join().unwrap();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Debug)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    event: Event,
}

impl CancellationToken {
    /// Create a new token. The token is initially not cancelled.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                event: Event::new(),
            }),
        }
    }

    /// Cancel the token, waking all waiters.
    ///
    /// Returns `true` for the call that performed the transition and `false`
    /// for every later call, which makes this usable as an idempotence guard.
    pub fn cancel(&self) -> bool {
        // Flag before notify so woken waiters observe it
        let first = !self.inner.cancelled.swap(true, Ordering::AcqRel);
        if first {
            self.inner.event.notify(usize::MAX);
        }
        first
    }

    /// Check if the token has been cancelled (non-blocking).
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Block the calling thread until the token is cancelled.
    pub fn wait(&self) {
        if self.is_cancelled() {
            return;
        }

        let listener = self.inner.event.listen();

        // cancel() may have run between the check and listen()
        if self.is_cancelled() {
            return;
        }

        listener.wait();
    }

    /// Block until the token is cancelled or `timeout` elapses.
    ///
    /// Returns whether the token was cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return true;
        };

        loop {
            if self.is_cancelled() {
                return true;
            }

            let listener = self.inner.event.listen();
            if self.is_cancelled() {
                return true;
            }

            if listener.wait_deadline(deadline).is_none() {
                return self.is_cancelled();
            }
        }
    }

    /// Wait asynchronously until the token is cancelled.
    ///
    /// Works on any executor; no runtime is required.
    pub fn cancelled(&self) -> Cancelled<'_> {
        Cancelled {
            token: self,
            listener: None,
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Future returned by [`CancellationToken::cancelled()`].
pub struct Cancelled<'a> {
    token: &'a CancellationToken,
    listener: Option<EventListener>,
}

impl Future for Cancelled<'_> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        loop {
            if self.token.is_cancelled() {
                return Poll::Ready(());
            }

            match self.listener.as_mut() {
                Some(listener) => {
                    if Pin::new(listener).poll(cx).is_pending() {
                        return Poll::Pending;
                    }
                    // Notified: drop the spent listener and re-check the flag
                    self.listener = None;
                }
                None => {
                    self.listener = Some(self.token.inner.event.listen());
                }
            }
        }
    }
}
