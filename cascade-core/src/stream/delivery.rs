// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Per-stream delivery worker.
//!
//! Each stream owns at most one worker thread, started on first use. Producers
//! push [`Delivery`] messages into an unbounded FIFO queue and the worker invokes
//! listeners for one message at a time, so a stream never runs two fan-outs
//! concurrently and a close is only delivered after every value queued before it.

use crate::cancellation_token::CancellationToken;
use crate::registry::Registry;
use crate::unwind::panic_message;
use async_channel::{Receiver, Sender};
use cascade_error::{CascadeError, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

pub(crate) type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;
pub(crate) type CloseListener = Box<dyn FnOnce() + Send>;

pub(crate) enum Delivery<T> {
    Value(T),
    Close,
}

/// State reachable from both the stream handles and the worker thread.
pub(crate) struct Shared<T> {
    pub(crate) name: String,
    pub(crate) listeners: Registry<Listener<T>>,
    pub(crate) close_listeners: Registry<CloseListener>,
    /// Cancelled once close-listeners have run and listeners were released
    pub(crate) delivered: CancellationToken,
}

impl<T> Shared<T> {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            listeners: Registry::new(),
            close_listeners: Registry::new(),
            delivered: CancellationToken::new(),
        }
    }

    pub(crate) fn deliver_value(&self, value: &T) {
        for listener in self.listeners.snapshot() {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener(value))) {
                error!(
                    "stream `{}`: listener panicked: {}",
                    self.name,
                    panic_message(&*payload)
                );
            }
        }
    }

    pub(crate) fn deliver_close(&self) {
        for callback in self.close_listeners.seal() {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(callback)) {
                error!(
                    "stream `{}`: close listener panicked: {}",
                    self.name,
                    panic_message(&*payload)
                );
            }
        }

        // No value can follow a close; dropping the listeners releases the
        // derived streams they keep alive.
        drop(self.listeners.seal());
        self.delivered.cancel();
    }
}

/// Starts the worker thread and returns the producer side of its queue.
pub(crate) fn spawn_worker<T: Send + 'static>(shared: Arc<Shared<T>>) -> Result<Sender<Delivery<T>>> {
    let (sender, receiver) = async_channel::unbounded();
    let thread_name = format!("cascade-{}", shared.name);

    thread::Builder::new()
        .name(thread_name)
        .spawn(move || run(&shared, &receiver))
        .map_err(|err| CascadeError::spawn_error("stream delivery worker", err))?;

    Ok(sender)
}

fn run<T>(shared: &Shared<T>, receiver: &Receiver<Delivery<T>>) {
    debug!("stream `{}`: delivery worker started", shared.name);

    while let Ok(delivery) = receiver.recv_blocking() {
        match delivery {
            Delivery::Value(value) => shared.deliver_value(&value),
            Delivery::Close => break,
        }
    }

    // Also reached when every sender vanished without a close message
    shared.deliver_close();
    debug!("stream `{}`: delivery worker stopped", shared.name);
}
