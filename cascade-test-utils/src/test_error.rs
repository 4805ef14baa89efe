// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use thiserror::Error;

/// Error returned by handlers that fail on purpose.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TestError {
    #[error("injected failure: {0}")]
    Injected(String),
    #[error("unexpected value: {0}")]
    UnexpectedValue(i64),
}

impl TestError {
    pub fn injected(message: impl Into<String>) -> Self {
        Self::Injected(message.into())
    }
}
