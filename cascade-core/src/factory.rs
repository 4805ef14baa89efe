// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Stream;
use cascade_error::Result;

/// Creates a stream and immediately emits a value built from `args`.
///
/// Delivery is asynchronous, so listeners attached right after this returns
/// receive the value only if they are registered before the worker delivers it.
/// Attach a close-listener or use [`Stream::reduce`] after closing when the
/// value must not be missed.
///
/// # Errors
///
/// [`CascadeError::SpawnError`](cascade_error::CascadeError::SpawnError) if the
/// delivery worker could not be started.
///
/// # Example
///
/// ```
/// use cascade_core::make_stream;
///
/// # fn main() -> cascade_core::Result<()> {
/// let greeting = make_stream::<String, _>("hello")?;
/// assert!(!greeting.is_closed());
/// # Ok(())
/// # }
/// ```
pub fn make_stream<T, A>(args: A) -> Result<Stream<T>>
where
    T: Send + 'static,
    A: Into<T>,
{
    let stream = Stream::new();
    stream.emit_from(args)?;
    Ok(stream)
}

impl<T: Send + 'static> Stream<T> {
    /// Same as [`make_stream`].
    ///
    /// # Errors
    ///
    /// See [`make_stream`].
    pub fn from_value<A>(args: A) -> Result<Self>
    where
        A: Into<T>,
    {
        make_stream(args)
    }
}
