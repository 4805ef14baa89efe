// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cascade_core::Stream;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Records the values delivered to a listener, plus how often the stream's
/// close-listener fired.
///
/// Cloning yields another view of the same recording.
#[derive(Debug)]
pub struct Recorder<T> {
    values: Arc<Mutex<Vec<T>>>,
    closes: Arc<AtomicUsize>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a recorder and registers it on `stream` as a value listener and
    /// a close-listener.
    pub fn attach(stream: &Stream<T>) -> Self {
        let recorder = Self::new();
        stream.add_listener(recorder.listener());
        stream.on_close(recorder.close_listener());
        recorder
    }

    /// A value listener appending to this recording.
    pub fn listener(&self) -> impl FnMut(&T) + Send + 'static {
        let values = Arc::clone(&self.values);
        move |value: &T| values.lock().push(value.clone())
    }

    /// A close-listener counting into this recording.
    pub fn close_listener(&self) -> impl FnOnce() + Send + 'static {
        let closes = Arc::clone(&self.closes);
        move || {
            closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Snapshot of the recorded values, in delivery order.
    pub fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }

    /// How many times the close-listener ran.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl<T: Clone + Send + 'static> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
            closes: Arc::clone(&self.closes),
        }
    }
}
