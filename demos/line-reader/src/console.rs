// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Stream consumers printing every value to standard output.

use std::fmt::Display;

/// Prints each value on its own line.
pub fn log<T: Display + 'static>() -> impl FnMut(&T) + Send + 'static {
    surrounded("", "")
}

/// Prints each value after `prefix`.
pub fn prefixed<T: Display + 'static>(prefix: &'static str) -> impl FnMut(&T) + Send + 'static {
    surrounded(prefix, "")
}

/// Prints each value between `prefix` and `suffix`.
pub fn surrounded<T: Display + 'static>(
    prefix: &'static str,
    suffix: &'static str,
) -> impl FnMut(&T) + Send + 'static {
    move |value: &T| println!("{}", render(prefix, value, suffix))
}

fn render<T: Display>(prefix: &str, value: &T, suffix: &str) -> String {
    format!("{prefix}{value}{suffix}")
}
