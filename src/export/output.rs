//! Output sink and comment lines.

use std::fs::File;
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use log::warn;

use crate::config::{ExportMode, HEADER_TIMESTAMP_FORMAT, PROGRAM_NAME};
use crate::error_handling::ExportError;

/// Buffered sink every export writes into.
pub type OutputSink = BufWriter<Box<dyn Write + Send>>;

/// Wrapper around a Write that ignores broken pipe errors (EPIPE).
/// This allows graceful handling when stdout is piped to a command that exits early.
pub(crate) struct IgnoreBrokenPipe<W: Write> {
    inner: W,
}

impl<W: Write> IgnoreBrokenPipe<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for IgnoreBrokenPipe<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).or_else(|e| {
            if e.kind() == ErrorKind::BrokenPipe {
                // downstream closed the pipe
                Ok(buf.len())
            } else {
                Err(e)
            }
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().or_else(|e| {
            if e.kind() == ErrorKind::BrokenPipe {
                Ok(())
            } else {
                Err(e)
            }
        })
    }
}

/// Opens the export sink: the file at `path` (created or truncated), or
/// stdout when no path is given.
pub fn open_output(path: Option<&Path>) -> Result<OutputSink, ExportError> {
    let inner: Box<dyn Write + Send> = match path {
        Some(path) => {
            let file = File::create(path).map_err(|source| ExportError::OutputOpen {
                path: path.to_path_buf(),
                source,
            })?;
            Box::new(file)
        }
        None => Box::new(IgnoreBrokenPipe::new(io::stdout())),
    };
    Ok(BufWriter::new(inner))
}

/// `/* export data by db_export at: 2024-01-01 12:00:00 */` followed by a
/// blank line.
pub fn header_comment(mode: ExportMode, at: NaiveDateTime) -> String {
    format!(
        "/* export {} by {} at: {} */\n\n",
        mode,
        PROGRAM_NAME,
        at.format(HEADER_TIMESTAMP_FORMAT)
    )
}

/// `/** chunk: N */` line written before each chunk.
pub fn chunk_marker(index: u64) -> String {
    format!("/** chunk: {index} */\n")
}

/// Writes a comment line, logging and swallowing any write failure.
///
/// Comments carry no data, so losing one never aborts an export. Returns
/// whether the write succeeded.
pub fn write_comment<W: Write + ?Sized>(out: &mut W, comment: &str) -> bool {
    match out.write_all(comment.as_bytes()) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to write comment {:?}: {}", comment.trim_end(), e);
            false
        }
    }
}
