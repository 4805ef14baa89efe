// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Combinator algebra over [`Stream`].
//!
//! `filter` and `map` build *derived* streams. The source keeps a strong handle
//! to each derived stream inside its forwarding listener and close-listener, so a
//! derived stream stays alive while its source can still feed it, even if the
//! caller drops every other handle. The source releases those handles once its
//! own close has been delivered, right after closing the derived streams. A
//! derived stream that never received a value is closed on the source's
//! delivery thread rather than on a worker of its own.
//!
//! `reduce` and the `*_match` helpers block the caller until the stream closes.
//! They do not short-circuit: every value delivered after registration is seen.

use super::Stream;
use cascade_error::{CascadeError, Result};
use parking_lot::Mutex;
use std::sync::Arc;

impl<T: Send + 'static> Stream<T> {
    /// Forwards every value of this stream into `other`.
    ///
    /// Closing this stream does not close `other`. Values arriving after `other`
    /// was closed are discarded.
    pub fn pipe(&self, other: &Stream<T>) -> &Self
    where
        T: Clone,
    {
        let target = other.clone();
        self.add_listener(move |value: &T| forward(&target, value.clone()))
    }

    /// Derived stream carrying only the values accepted by `predicate`.
    ///
    /// Closes after this stream closes.
    pub fn filter<P>(&self, mut predicate: P) -> Stream<T>
    where
        T: Clone,
        P: FnMut(&T) -> bool + Send + 'static,
    {
        self.derive("filter", move |value: &T, target: &Stream<T>| {
            if predicate(value) {
                forward(target, value.clone());
            }
        })
    }

    /// Derived stream carrying `mapper(value)` for every value of this stream.
    ///
    /// Closes after this stream closes.
    pub fn map<U, M>(&self, mut mapper: M) -> Stream<U>
    where
        U: Send + 'static,
        M: FnMut(&T) -> U + Send + 'static,
    {
        self.derive("map", move |value: &T, target: &Stream<U>| {
            forward(target, mapper(value));
        })
    }

    /// Alias for [`map`](Self::map).
    pub fn map_to<U, M>(&self, mapper: M) -> Stream<U>
    where
        U: Send + 'static,
        M: FnMut(&T) -> U + Send + 'static,
    {
        self.map(mapper)
    }

    /// Pass-through listener; returns this stream for chaining.
    pub fn peek<F>(&self, consumer: F) -> &Self
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.add_listener(consumer)
    }

    /// Terminal listener.
    pub fn for_each<F>(&self, consumer: F)
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.add_listener(consumer);
    }

    /// Folds every delivered value into an accumulator and returns it once the
    /// stream has closed.
    ///
    /// **Blocks** the calling thread until the close has been delivered. Only
    /// values delivered after this call registers its listener are folded; on an
    /// already closed stream `initial` comes straight back.
    ///
    /// # Errors
    ///
    /// [`CascadeError::CallbackPanic`] if `reducer` panicked, which loses the
    /// accumulator.
    pub fn reduce<A, R>(&self, mut reducer: R, initial: A) -> Result<A>
    where
        A: Send + 'static,
        R: FnMut(A, &T) -> A + Send + 'static,
    {
        let slot = Arc::new(Mutex::new(Some(initial)));

        let accumulator = Arc::clone(&slot);
        self.add_listener(move |value: &T| {
            let mut accumulator = accumulator.lock();
            if let Some(current) = accumulator.take() {
                *accumulator = Some(reducer(current, value));
            }
        });

        self.wait();

        let result = slot.lock().take();
        result.ok_or_else(|| CascadeError::callback_panic(format!("reducer on stream `{}`", self.name())))
    }

    /// Whether at least one delivered value satisfies `predicate`.
    ///
    /// **Blocks** like [`reduce`](Self::reduce). `false` for a stream that
    /// closes without values.
    ///
    /// # Errors
    ///
    /// [`CascadeError::CallbackPanic`] if `predicate` panicked.
    pub fn any_match<P>(&self, mut predicate: P) -> Result<bool>
    where
        P: FnMut(&T) -> bool + Send + 'static,
    {
        self.reduce(move |found, value: &T| found || predicate(value), false)
    }

    /// Whether every delivered value satisfies `predicate`.
    ///
    /// **Blocks** like [`reduce`](Self::reduce). `true` for a stream that
    /// closes without values.
    ///
    /// # Errors
    ///
    /// [`CascadeError::CallbackPanic`] if `predicate` panicked.
    pub fn all_match<P>(&self, mut predicate: P) -> Result<bool>
    where
        P: FnMut(&T) -> bool + Send + 'static,
    {
        self.reduce(move |all, value: &T| all && predicate(value), true)
    }

    /// Whether no delivered value satisfies `predicate`; the negation of
    /// [`any_match`](Self::any_match).
    ///
    /// # Errors
    ///
    /// [`CascadeError::CallbackPanic`] if `predicate` panicked.
    pub fn none_match<P>(&self, predicate: P) -> Result<bool>
    where
        P: FnMut(&T) -> bool + Send + 'static,
    {
        self.any_match(predicate).map(|found| !found)
    }

    fn derive<U, F>(&self, operator: &str, mut forward_value: F) -> Stream<U>
    where
        U: Send + 'static,
        F: FnMut(&T, &Stream<U>) + Send + 'static,
    {
        let derived = Stream::named(format!("{}/{operator}", self.name()));

        let target = derived.clone();
        self.add_listener(move |value: &T| forward_value(value, &target));

        let target = derived.clone();
        self.on_close(move || {
            target.close_in_place();
        });

        derived
    }
}

fn forward<U: Send + 'static>(target: &Stream<U>, value: U) {
    if let Err(err) = target.emit(value) {
        trace!("stream `{}`: forwarded value dropped: {}", target.name(), err);
    }
}
