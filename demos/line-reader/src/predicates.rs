// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Line predicates and conversions used by the pipelines.

/// Empty or whitespace-only.
pub fn is_whitespace<S: AsRef<str> + ?Sized>(line: &S) -> bool {
    line.as_ref().trim().is_empty()
}

pub fn is_not_whitespace<S: AsRef<str> + ?Sized>(line: &S) -> bool {
    !is_whitespace(line)
}

/// An unsigned decimal literal that fits in an `i64`.
pub fn is_int<S: AsRef<str> + ?Sized>(line: &S) -> bool {
    let line = line.as_ref();
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()) && line.parse::<i64>().is_ok()
}

/// Parses a line accepted by [`is_int`]; anything else maps to `0`.
pub fn to_int<S: AsRef<str> + ?Sized>(line: &S) -> i64 {
    line.as_ref().parse().unwrap_or_default()
}
