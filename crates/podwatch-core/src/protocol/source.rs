//! Byte-source abstraction over the tapped transports
//!
//! The decoder loop only ever needs "one byte or not yet"; this seam keeps
//! it independent of the underlying transport and lets tests drive it from
//! canned byte sequences.

use serialport::SerialPort;
use std::io::{self, Read};

use super::{configure_port, open_port, SnifferError};

/// A forward-only stream of bytes from one side of the conversation
pub trait ByteSource: Send {
    /// Read the next byte
    ///
    /// `Ok(None)` means the bounded read timeout elapsed with no data; the
    /// caller treats it as a liveness poll, not an error. A returned error
    /// is fatal for this source only.
    fn read_one(&mut self) -> Result<Option<u8>, SnifferError>;

    /// Release the underlying transport
    fn close(&mut self);

    /// Human label for diagnostics (port path, test tag)
    fn describe(&self) -> String;
}

/// Serial-port-backed byte source
pub struct SerialByteSource {
    port: Option<Box<dyn SerialPort>>,
    name: String,
}

impl SerialByteSource {
    /// Open and configure the named port for capture
    pub fn open(
        name: &str,
        baud_rate: Option<u32>,
        read_timeout_ms: Option<u64>,
    ) -> Result<Self, SnifferError> {
        let mut port = open_port(name, baud_rate, read_timeout_ms)?;
        configure_port(port.as_mut())?;
        Ok(Self {
            port: Some(port),
            name: name.to_string(),
        })
    }

}

impl ByteSource for SerialByteSource {
    fn read_one(&mut self) -> Result<Option<u8>, SnifferError> {
        let port = self.port.as_mut().ok_or(SnifferError::SourceClosed)?;

        let mut byte = [0u8; 1];
        match port.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(SnifferError::IoError(e)),
        }
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            tracing::debug!(port = %self.name, "closed byte source");
        }
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

impl Drop for SerialByteSource {
    fn drop(&mut self) {
        self.close();
    }
}
