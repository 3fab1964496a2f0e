//! Concurrency-safe transcript output
//!
//! Both capture threads funnel their lines through one sink. A single lock
//! spans "write one line + flush", so lines from the two sides interleave
//! only at line granularity and appear as soon as the scheduler allows.

use std::io::{self, Write};
use std::sync::Mutex;

/// Serializes concurrently produced transcript lines into one stream
pub struct TranscriptSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl TranscriptSink {
    /// Wrap any writer
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Sink writing to standard output
    ///
    /// Logging goes to stderr, so the transcript stream stays clean for
    /// redirection.
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Write one line atomically and flush it
    ///
    /// The lock is held for the whole line, never per byte. Write failures
    /// are logged rather than propagated; a full terminal pipe must not
    /// kill a capture thread.
    pub fn write_line(&self, line: &str) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            // A panicking writer thread poisons the lock; the writer state
            // itself is still line-aligned.
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "transcript write failed");
        }
    }
}
