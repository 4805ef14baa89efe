// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cascade_core::{CascadeError, Stream};
use cascade_test_utils::{assert_closes_within, assert_closes_within_async, Recorder};
use futures::FutureExt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

#[test]
fn test_values_are_delivered_in_emission_order() -> anyhow::Result<()> {
    let stream = Stream::<u32>::new();
    let recorder = Recorder::attach(&stream);

    stream.emit_all(0..100)?;
    stream.close();
    stream.wait();

    assert_eq!(recorder.values(), (0..100).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_listeners_run_in_registration_order() -> anyhow::Result<()> {
    let stream = Stream::<i32>::new();
    let order = Recorder::<&str>::new();

    let mut first = order.listener();
    let mut second = order.listener();
    stream
        .add_listener(move |_| first(&"first"))
        .on_value(move |_| second(&"second"));

    stream.emit(1)?.emit(2)?;
    stream.close();
    stream.wait();

    assert_eq!(order.values(), vec!["first", "second", "first", "second"]);
    Ok(())
}

#[test]
fn test_close_is_idempotent() -> anyhow::Result<()> {
    let stream = Stream::<i32>::new();
    let recorder = Recorder::attach(&stream);

    stream.emit(1)?;
    stream.close().close();
    stream.close();
    stream.wait();

    assert!(stream.is_closed());
    assert_eq!(recorder.close_count(), 1);
    assert_eq!(recorder.values(), vec![1]);
    Ok(())
}

#[test]
fn test_close_listeners_run_in_registration_order() {
    let stream = Stream::<i32>::new();
    let order = Recorder::<u8>::new();

    for tag in 1..=3u8 {
        let mut record = order.listener();
        stream.on_close(move || record(&tag));
    }

    stream.close();
    stream.wait();

    assert_eq!(order.values(), vec![1, 2, 3]);
}

#[test]
fn test_emit_after_close_is_rejected() -> anyhow::Result<()> {
    let stream = Stream::<i32>::new();
    let recorder = Recorder::attach(&stream);

    stream.emit(1)?;
    stream.close();

    let err = stream.emit(2).unwrap_err();
    assert!(matches!(err, CascadeError::StreamClosed));
    assert!(err.is_recoverable());

    stream.wait();
    assert_eq!(recorder.values(), vec![1]);
    Ok(())
}

#[test]
fn test_emit_all_stops_at_the_first_rejection() {
    let stream = Stream::<i32>::new();
    stream.close();

    let result = stream.emit_all([1, 2, 3]);

    assert!(matches!(result, Err(CascadeError::StreamClosed)));
}

#[test]
fn test_emit_from_converts_the_argument() -> anyhow::Result<()> {
    let stream = Stream::<String>::new();
    let recorder = Recorder::attach(&stream);

    stream.emit_from("converted")?;
    stream.close();
    stream.wait();

    assert_eq!(recorder.values(), vec!["converted".to_string()]);
    Ok(())
}

#[test]
fn test_close_is_delivered_after_queued_values() -> anyhow::Result<()> {
    let stream = Stream::<usize>::new();
    let delivered = Arc::new(AtomicUsize::new(0));
    let seen_at_close = Arc::new(AtomicUsize::new(usize::MAX));

    let counter = Arc::clone(&delivered);
    stream.add_listener(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = Arc::clone(&delivered);
    let snapshot = Arc::clone(&seen_at_close);
    stream.on_close(move || snapshot.store(counter.load(Ordering::SeqCst), Ordering::SeqCst));

    stream.emit_all(0..500)?;
    stream.close();
    stream.wait();

    assert_eq!(seen_at_close.load(Ordering::SeqCst), 500);
    Ok(())
}

#[test]
fn test_concurrent_emitters_deliver_every_accepted_value() {
    let stream = Stream::<usize>::new();
    let recorder = Recorder::attach(&stream);

    let producers: Vec<_> = (0..4)
        .map(|producer| {
            let stream = stream.clone();
            thread::spawn(move || {
                for n in 0..250 {
                    let _ = stream.emit(producer * 1000 + n);
                }
            })
        })
        .collect();
    for producer in producers {
        assert!(producer.join().is_ok());
    }

    stream.close();
    stream.wait();

    let values = recorder.values();
    assert_eq!(values.len(), 1000);
    // Per-producer order survives interleaving
    for producer in 0..4 {
        let own: Vec<_> = values.iter().filter(|v| **v / 1000 == producer).collect();
        assert!(own.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

#[test]
fn test_late_listener_is_dropped() {
    let stream = Stream::<i32>::new();
    stream.add_listener(|_| {});
    assert_eq!(stream.listener_count(), 1);

    stream.close();
    stream.wait();
    assert_eq!(stream.listener_count(), 0);

    stream.add_listener(|_| {});
    assert_eq!(stream.listener_count(), 0);
}

#[test]
fn test_late_close_listener_runs_immediately() {
    let stream = Stream::<i32>::new();
    stream.close();
    stream.wait();

    let fired = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&fired);
    stream.on_close(move || flag.store(true, Ordering::SeqCst));

    assert!(fired.load(Ordering::SeqCst));
}

#[test]
fn test_wait_returns_immediately_when_closed() {
    let stream = Stream::<i32>::new();
    stream.close();

    stream.wait();
    stream.wait();
    assert!(stream.wait_timeout(Duration::ZERO));
}

#[test]
fn test_wait_unblocks_when_another_thread_closes() {
    let stream = Stream::<i32>::new();
    let closer = {
        let stream = stream.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            stream.close();
        })
    };

    stream.wait();

    assert!(stream.is_closed());
    assert!(closer.join().is_ok());
}

#[test]
fn test_wait_timeout_on_open_stream() {
    let stream = Stream::<i32>::new();

    assert!(!stream.wait_timeout(Duration::from_millis(20)));
    assert!(!stream.is_closed());
}

#[test]
fn test_releasing_the_last_handle_closes_the_stream() -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel();

    let stream = Stream::<i32>::new();
    let recorder = Recorder::attach(&stream);
    stream.on_close(move || {
        let _ = tx.send(());
    });
    stream.emit(1)?;
    drop(stream);

    assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    assert_eq!(recorder.values(), vec![1]);
    assert_eq!(recorder.close_count(), 1);
    Ok(())
}

#[test]
fn test_releasing_an_unused_stream_runs_its_close_listeners() {
    let fired = Arc::new(AtomicBool::new(false));

    let stream = Stream::<i32>::new();
    let flag = Arc::clone(&fired);
    stream.on_close(move || flag.store(true, Ordering::SeqCst));
    drop(stream);

    // No worker was ever started, so the close is delivered inline
    assert!(fired.load(Ordering::SeqCst));
}

#[test]
fn test_clones_keep_the_stream_open() -> anyhow::Result<()> {
    let stream = Stream::<i32>::new();
    let handle = stream.clone();
    drop(stream);

    assert!(!handle.is_closed());
    handle.emit(1)?;
    Ok(())
}

#[test]
fn test_panicking_listener_does_not_affect_others() -> anyhow::Result<()> {
    let stream = Stream::<i32>::new();
    stream.add_listener(|value| {
        if *value == 2 {
            panic!("listener failure on {value}");
        }
    });
    let recorder = Recorder::attach(&stream);

    stream.emit_all([1, 2, 3])?;
    stream.close();
    stream.wait();

    assert_eq!(recorder.values(), vec![1, 2, 3]);
    assert_eq!(recorder.close_count(), 1);
    Ok(())
}

#[test]
fn test_panicking_close_listener_does_not_affect_others() {
    let stream = Stream::<i32>::new();
    stream.on_close(|| panic!("close listener failure"));
    let recorder = Recorder::attach(&stream);

    stream.close();
    assert_closes_within(&stream, 5000);

    assert_eq!(recorder.close_count(), 1);
}

#[test]
fn test_listener_may_register_listeners() -> anyhow::Result<()> {
    let stream = Stream::<i32>::new();
    let recorder = Recorder::<i32>::new();

    let handle = stream.clone();
    let late = recorder.clone();
    let mut registered = false;
    stream.add_listener(move |_| {
        if !registered {
            registered = true;
            handle.add_listener(late.listener());
        }
    });

    stream.emit(1)?;
    stream.emit(2)?;
    stream.close();
    stream.wait();

    // The new listener sees the values after the one that registered it
    assert_eq!(recorder.values(), vec![2]);
    Ok(())
}

#[test]
fn test_listener_may_emit_on_another_stream() -> anyhow::Result<()> {
    let source = Stream::<i32>::new();
    let target = Stream::<i32>::new();
    let recorder = Recorder::attach(&target);

    let forward = target.clone();
    source.add_listener(move |value| {
        let _ = forward.emit(value * 10);
    });

    source.emit(4)?;
    source.close();
    source.wait();
    target.close();
    target.wait();

    assert_eq!(recorder.values(), vec![40]);
    Ok(())
}

#[test]
fn test_name_and_debug() {
    let stream = Stream::<i32>::named("sensor");

    assert_eq!(stream.name(), "sensor");
    assert!(format!("{stream:?}").contains("sensor"));
    assert_eq!(Stream::<i32>::default().name(), "stream");
}

#[tokio::test]
async fn test_closed_future_resolves_after_close() {
    let stream = Stream::<i32>::new();
    let closer = {
        let stream = stream.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            stream.close();
        })
    };

    assert_closes_within_async(&stream, 5000).await;
    assert!(closer.join().is_ok());
}

#[test]
fn test_closed_future_is_pending_while_open() {
    let stream = Stream::<i32>::new();

    assert!(stream.closed().now_or_never().is_none());

    stream.close();
    stream.wait();

    assert!(stream.closed().now_or_never().is_some());
}
