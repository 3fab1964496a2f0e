//! Apple Accessory Protocol wire handling
//!
//! Implements framing and validation for the length-prefixed, checksummed
//! packet format the iPod and its accessories exchange over serial.

mod error;
mod framer;
mod packet;
pub mod serial;
mod source;

pub use error::SnifferError;
pub use framer::{FrameResult, Framer};
pub use packet::{checksum, encode_frame, Packet};
pub use serial::{configure_port, list_ports, open_port, PortInfo};
pub use source::{ByteSource, SerialByteSource};

/// Two-byte sync marker opening every frame
pub const FRAME_MARKER: [u8; 2] = [0xFF, 0x55];

/// Default baud rate for the accessory link
pub const DEFAULT_BAUD_RATE: u32 = 38400;

/// Default per-read timeout in milliseconds
///
/// Bounds every blocking read so the watch loop can observe shutdown.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 250;

/// Smallest declared payload length: mode byte plus the two command bytes
pub const MIN_PAYLOAD_LEN: usize = 3;

/// Bytes of frame overhead around the payload: marker, length byte, checksum
pub const FRAME_OVERHEAD: usize = 4;
