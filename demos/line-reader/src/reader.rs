// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cascade::{Stream, TaskContext, TaskExit};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

pub const OPEN_FAILED: &str = "Could not open file";
pub const READ_FAILED: &str = "Stopped reading before EOF";

/// Task handler body: emits every line of the file at `path`.
///
/// Stops the task when the file cannot be opened or a read fails midway.
pub fn stream_file(
    path: &Path,
    ctx: &TaskContext<String>,
    stream: &Stream<String>,
) -> Result<(), TaskExit> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "open failed");
            return Err(ctx.stop_with(OPEN_FAILED));
        }
    };

    for line in BufReader::new(file).lines() {
        match line {
            Ok(line) => {
                stream.emit(line)?;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "read failed");
                return Err(ctx.stop_with(READ_FAILED));
            }
        }
    }

    Ok(())
}
