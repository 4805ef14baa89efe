// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cascade_core::CancellationToken;
use futures::FutureExt;
use std::thread;
use std::time::Duration;

#[test]
fn test_cancel_reports_the_first_transition_only() {
    let token = CancellationToken::new();
    assert!(!token.is_cancelled());

    assert!(token.cancel());
    assert!(!token.cancel());
    assert!(token.is_cancelled());
}

#[test]
fn test_clones_share_the_flag() {
    let token = CancellationToken::default();
    let clone = token.clone();

    clone.cancel();

    assert!(token.is_cancelled());
}

#[test]
fn test_wait_unblocks_on_cancel_from_another_thread() {
    let token = CancellationToken::new();
    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            token.cancel();
        })
    };

    token.wait();

    assert!(token.is_cancelled());
    assert!(canceller.join().is_ok());
}

#[test]
fn test_wait_returns_immediately_when_cancelled() {
    let token = CancellationToken::new();
    token.cancel();

    token.wait();
    assert!(token.wait_timeout(Duration::ZERO));
}

#[test]
fn test_wait_timeout_expires_while_pending() {
    let token = CancellationToken::new();

    assert!(!token.wait_timeout(Duration::from_millis(20)));
}

#[test]
fn test_many_waiters_are_released() {
    let token = CancellationToken::new();
    let waiters: Vec<_> = (0..8)
        .map(|_| {
            let token = token.clone();
            thread::spawn(move || token.wait_timeout(Duration::from_secs(5)))
        })
        .collect();

    token.cancel();

    for waiter in waiters {
        assert!(matches!(waiter.join(), Ok(true)));
    }
}

#[test]
fn test_cancelled_future_is_pending_until_cancel() {
    let token = CancellationToken::new();
    assert!(token.cancelled().now_or_never().is_none());

    token.cancel();

    assert!(token.cancelled().now_or_never().is_some());
}

#[tokio::test]
async fn test_cancelled_future_wakes_the_task() {
    let token = CancellationToken::new();
    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        })
    };

    tokio::time::timeout(Duration::from_secs(5), token.cancelled())
        .await
        .expect("token was not cancelled in time");

    assert!(canceller.await.is_ok());
}
