//! # PodWatch Core Library
//!
//! Core functionality for the PodWatch serial protocol sniffer.
//!
//! This library provides:
//! - Packet framing and resynchronization for the Apple Accessory Protocol
//! - Table-driven decoding of mode/command pairs into readable text
//! - A concurrency-safe transcript sink shared by both capture directions
//! - The watch loop binding a serial byte source to a decoder per direction
//!
//! ## Example
//!
//! ```rust,ignore
//! use podwatch_core::prelude::*;
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//!
//! let sink = Arc::new(TranscriptSink::stdout());
//! let shutdown = Arc::new(AtomicBool::new(false));
//!
//! let request = SerialByteSource::open("/dev/ttyUSB0", None, None)?;
//! let response = SerialByteSource::open("/dev/ttyUSB1", None, None)?;
//!
//! Watcher::new(sink, shutdown).run(request, response)?;
//! ```

#![warn(missing_docs)]

pub mod decode;
pub mod protocol;
pub mod transcript;
pub mod watch;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::decode::{lookup_command, lookup_mode, ParamDecoder};
    pub use crate::protocol::{
        list_ports, open_port, Framer, FrameResult, Packet, PortInfo, SerialByteSource,
        SnifferError,
    };
    pub use crate::transcript::{DecodedEvent, Direction, OutputFormat, TranscriptSink};
    pub use crate::watch::{StreamDecoder, Watcher};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
