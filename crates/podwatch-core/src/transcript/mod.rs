//! Transcript events and line rendering
//!
//! One `DecodedEvent` is produced per accepted frame and rendered into a
//! single output line, either as the fixed-width text format downstream
//! tooling parses or as one JSON object per line.

mod sink;

pub use sink::TranscriptSink;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::decode::{byte_list, hex_line, lookup_command, lookup_mode, ParamDecoder};
use crate::protocol::Packet;

/// Which side of the conversation a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Accessory to player
    Request,
    /// Player to accessory
    Response,
}

impl Direction {
    /// Fixed arrow prefix distinguishing the two sides
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Request => "-->",
            Direction::Response => "<--",
        }
    }
}

/// Transcript output rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Fixed-width text lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// The human-readable record emitted for one accepted frame
///
/// Immutable once created; ownership passes to the sink for formatting.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedEvent {
    /// Conversation side
    pub direction: Direction,
    /// Wall-clock capture time
    pub timestamp: DateTime<Utc>,
    /// Milliseconds since the previous accepted frame on this stream
    pub delay_ms: u64,
    /// Mode byte
    pub mode: u8,
    /// Mode name, when the mode byte is recognized
    pub mode_name: Option<&'static str>,
    /// Two-byte command selector
    pub command: (u8, u8),
    /// Command label, when mode and command both resolve
    pub command_label: Option<&'static str>,
    /// Ellipsized hex dump of the full wire span
    pub raw_hex: String,
    /// Decoded parameter text, when the entry carries a decoder
    pub decoded_params: Option<String>,
}

impl DecodedEvent {
    /// Decode an accepted packet into its transcript record
    ///
    /// Command resolution only happens under a recognized mode; an
    /// unresolved mode or command still yields an event so the operator
    /// sees the raw bytes of unknown protocol extensions.
    pub fn decode(direction: Direction, packet: &Packet, delay_ms: u64) -> Self {
        let mode_name = lookup_mode(packet.mode);
        let entry = mode_name.and_then(|_| lookup_command(packet.mode, packet.command));
        let decoded_params = entry
            .and_then(|e| e.decoder.as_ref())
            .map(|d: &ParamDecoder| d.decode(&packet.parameters));

        Self {
            direction,
            timestamp: Utc::now(),
            delay_ms,
            mode: packet.mode,
            mode_name,
            command: packet.command,
            command_label: entry.map(|e| e.label),
            raw_hex: hex_line(&packet.raw),
            decoded_params,
        }
    }

    /// Fixed-width text rendering
    ///
    /// `<arrow> <delay>ms: <hex> [<mode>] (<cmd0> <cmd1>) <label> -- <params>`
    /// with the label empty for unresolved entries and the ` -- ` tail only
    /// present when parameters decoded.
    pub fn text_line(&self) -> String {
        let params = self
            .decoded_params
            .as_deref()
            .map(|p| format!(" -- {}", p))
            .unwrap_or_default();

        format!(
            "{} {:>5}ms: <{:<60}> [{:02x}] ({:02x} {:02x}) {}{}",
            self.direction.arrow(),
            self.delay_ms,
            self.raw_hex,
            self.mode,
            self.command.0,
            self.command.1,
            self.command_label.unwrap_or(""),
            params,
        )
    }

    /// JSON rendering, one object per line
    pub fn json_line(&self) -> String {
        // Serialization of this shape cannot fail; fall back to an empty
        // object rather than poisoning the transcript if it ever does.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Render in the requested output format
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.text_line(),
            OutputFormat::Json => self.json_line(),
        }
    }
}

/// Diagnostic line for a run of bytes the framer rejected
pub fn discarded_line(direction: Direction, bytes: &[u8], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!(
            "{} discarded data: {}",
            direction.arrow(),
            byte_list(bytes)
        ),
        OutputFormat::Json => serde_json::json!({
            "direction": match direction {
                Direction::Request => "request",
                Direction::Response => "response",
            },
            "timestamp": Utc::now(),
            "discarded": bytes,
        })
        .to_string(),
    }
}
