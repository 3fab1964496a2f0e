//! Sniffer errors

use thiserror::Error;

/// Errors that can occur while capturing a serial stream
///
/// Framing desync and unrecognized mode/command bytes are deliberately not
/// represented here: both are surfaced as transcript diagnostics and never
/// abort a capture.
#[derive(Error, Debug)]
pub enum SnifferError {
    #[error("Serial port error: {0}")]
    SerialError(String),

    #[error("Port not found: {0}")]
    PortNotFound(String),

    #[error("Byte source closed")]
    SourceClosed,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
