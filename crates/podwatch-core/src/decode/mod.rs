//! Human decoding of framed packets
//!
//! Table-driven mapping of mode/command pairs to labels and parameter
//! renderings, plus the pure field codecs the renderers share.

pub mod codec;
pub mod tables;

pub use codec::{byte_list, format_ms, hex_line, hex_string, printable, u32_be};
pub use tables::{lookup_command, lookup_mode, CommandEntry, ParamDecoder};
