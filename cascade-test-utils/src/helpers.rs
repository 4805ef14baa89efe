// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::recorder::Recorder;
use cascade_core::Stream;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::time::sleep;

/// Registers a recorder, blocks until the close has been delivered and returns
/// everything delivered in between.
///
/// Values delivered before this call registers its listener are not included.
pub fn collect_until_closed<T>(stream: &Stream<T>) -> Vec<T>
where
    T: Clone + Send + 'static,
{
    let recorder = Recorder::new();
    stream.add_listener(recorder.listener());
    stream.wait();
    recorder.values()
}

/// Panics unless the close of `stream` is delivered within `timeout_ms`.
pub fn assert_closes_within<T: Send + 'static>(stream: &Stream<T>, timeout_ms: u64) {
    assert!(
        stream.wait_timeout(Duration::from_millis(timeout_ms)),
        "Timeout: stream `{}` not closed within {} ms",
        stream.name(),
        timeout_ms
    );
}

/// Async counterpart of [`assert_closes_within`].
pub async fn assert_closes_within_async<T: Send + 'static>(stream: &Stream<T>, timeout_ms: u64) {
    tokio::select! {
        () = stream.closed() => {}
        () = sleep(Duration::from_millis(timeout_ms)) => {
            panic!("Timeout: stream `{}` not closed within {} ms", stream.name(), timeout_ms);
        }
    }
}

/// Runs `action` on a new thread once `watched` has at least `listeners` value
/// listeners.
///
/// Lets a test register a blocking consumer such as `reduce` on the current
/// thread and only start producing once that consumer is listening, so no
/// value is delivered before it.
pub fn spawn_when_listened<U, F>(watched: &Stream<U>, listeners: usize, action: F) -> JoinHandle<()>
where
    U: Send + 'static,
    F: FnOnce() + Send + 'static,
{
    let watched = watched.clone();
    thread::spawn(move || {
        while watched.listener_count() < listeners {
            thread::yield_now();
        }
        action();
    })
}
