// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Lines as a line-oriented reader would produce them: words, integers,
/// blank and whitespace-only lines.
pub fn sample_lines() -> Vec<String> {
    ["alpha", "42", "", "   ", "-7", "beta gamma", "\t", "3.5", "1000"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// The lines of [`sample_lines`] that parse as integers, in order.
pub fn sample_numbers() -> Vec<i64> {
    vec![42, -7, 1000]
}
