// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cascade_core::Stream;
use cascade_test_utils::{
    assert_closes_within, assert_closes_within_async, collect_until_closed, sample_lines,
    sample_numbers, spawn_when_listened, Recorder, TestError,
};

#[test]
fn test_recorder_captures_values_and_close() -> anyhow::Result<()> {
    let stream = Stream::<&str>::new();
    let recorder = Recorder::attach(&stream);

    stream.emit("a")?.emit("b")?;
    stream.close();
    stream.wait();

    assert_eq!(recorder.values(), vec!["a", "b"]);
    assert_eq!(recorder.len(), 2);
    assert_eq!(recorder.close_count(), 1);
    Ok(())
}

#[test]
fn test_recorder_clones_share_the_recording() -> anyhow::Result<()> {
    let stream = Stream::<u8>::new();
    let recorder = Recorder::new();
    let view = recorder.clone();
    stream.add_listener(recorder.listener());

    stream.emit(9)?;
    stream.close();
    stream.wait();

    assert_eq!(view.values(), vec![9]);
    assert_eq!(view.close_count(), 0);
    Ok(())
}

#[test]
fn test_collect_until_closed_returns_values_emitted_after_registration() {
    let stream = Stream::<i32>::new();
    let producer = spawn_when_listened(&stream, 1, {
        let stream = stream.clone();
        move || {
            let _ = stream.emit_all([1, 2, 3]);
            stream.close();
        }
    });

    let collected = collect_until_closed(&stream);

    assert!(producer.join().is_ok());
    assert_eq!(collected, vec![1, 2, 3]);
}

#[test]
fn test_assert_closes_within_closed_stream() {
    let stream = Stream::<i32>::new();
    stream.close();

    assert_closes_within(&stream, 1000);
}

#[test]
#[should_panic = "Timeout: stream `idle` not closed within 50 ms"]
fn test_assert_closes_within_open_stream() {
    let stream = Stream::<i32>::named("idle");

    assert_closes_within(&stream, 50);
}

#[tokio::test]
async fn test_assert_closes_within_async_closed_stream() {
    let stream = Stream::<i32>::new();
    stream.close();

    assert_closes_within_async(&stream, 1000).await;
}

#[tokio::test]
#[should_panic = "Timeout: stream `idle` not closed within 50 ms"]
async fn test_assert_closes_within_async_open_stream() {
    let stream = Stream::<i32>::named("idle");

    assert_closes_within_async(&stream, 50).await;
}

#[test]
fn test_sample_numbers_are_the_integer_lines() {
    let parsed: Vec<i64> = sample_lines()
        .iter()
        .filter_map(|line| line.parse().ok())
        .collect();

    assert_eq!(parsed, sample_numbers());
}

#[test]
fn test_error_display() {
    assert_eq!(
        TestError::injected("boom").to_string(),
        "injected failure: boom"
    );
    assert_eq!(
        TestError::UnexpectedValue(3).to_string(),
        "unexpected value: 3"
    );
}

#[test]
fn test_spawn_when_listened_waits_for_the_consumer() -> anyhow::Result<()> {
    let stream = Stream::<i32>::new();
    let producer = spawn_when_listened(&stream, 1, {
        let stream = stream.clone();
        move || {
            let _ = stream.emit_all([4, 5]);
            stream.close();
        }
    });

    let total = stream.reduce(|acc, n| acc + n, 0)?;

    assert!(producer.join().is_ok());
    assert_eq!(total, 9);
    Ok(())
}
