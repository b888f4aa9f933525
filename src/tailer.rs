//! Incremental line reading from the active log file.
//!
//! The tailer keeps a byte offset into the current file and, on each poll
//! cycle, reads from that offset to end-of-file and yields the complete
//! lines found. A trailing partial line is never yielded: the offset only
//! advances past the last newline, so the partial tail is re-read on the
//! next cycle once the rest of it has been written.

use std::io::{self, SeekFrom};
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::warn;

/// Read cursor into the active log file.
#[derive(Debug, Default)]
pub struct Tailer {
    offset: u64,
}

impl Tailer {
    /// Create a tailer positioned at the start of the file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current byte offset into the file.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Reset the cursor to the start of the file, e.g. after rotation.
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Position the cursor at the current end of `path`.
    ///
    /// Used on startup so that lines written before the process started are
    /// not scanned.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be inspected.
    pub async fn seek_to_end(&mut self, path: &Path) -> io::Result<()> {
        self.offset = tokio::fs::metadata(path).await?.len();
        Ok(())
    }

    /// Read all complete lines appended since the last call.
    ///
    /// Lines are split on `\n`; a trailing `\r` is stripped. Non-UTF-8 bytes
    /// are replaced lossily rather than treated as errors. If the file has
    /// shrunk below the stored offset (truncation, or a rotation the locator
    /// could not see), the cursor resets to zero and the file is re-read
    /// from the start.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be read. The
    /// cursor is left unchanged so the next cycle can retry.
    pub async fn read_new_lines(&mut self, path: &Path) -> io::Result<Vec<String>> {
        let len = tokio::fs::metadata(path).await?.len();
        if len < self.offset {
            warn!(
                file = %path.display(),
                offset = self.offset,
                len,
                "log file shrank below read offset; re-reading from start"
            );
            self.offset = 0;
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        let mut file = File::open(path).await?;
        file.seek(SeekFrom::Start(self.offset)).await?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await?;

        // Only consume up to the last newline; the partial tail stays in
        // the file for the next cycle.
        let Some(last_newline) = buf.iter().rposition(|&b| b == b'\n') else {
            return Ok(Vec::new());
        };
        let complete = &buf[..=last_newline];
        let consumed = u64::try_from(last_newline.saturating_add(1)).unwrap_or(u64::MAX);
        self.offset = self.offset.saturating_add(consumed);

        let text = String::from_utf8_lossy(complete);
        Ok(text.lines().map(str::to_owned).collect())
    }
}
