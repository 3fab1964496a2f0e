//! Packet layout and validation
//!
//! Implements the Apple Accessory Protocol frame format.
//!
//! Wire layout:
//! - 2 bytes: sync marker `FF 55`
//! - 1 byte: payload length (mode + command pair + parameters)
//! - N bytes: payload
//! - 1 byte: checksum (additive complement of the payload, mod 256)

use std::time::Instant;

use super::{FRAME_MARKER, FRAME_OVERHEAD, MIN_PAYLOAD_LEN};

/// One validated protocol frame
#[derive(Debug, Clone)]
pub struct Packet {
    /// Mode byte selecting the command sub-table
    pub mode: u8,
    /// Two-byte command selector within the mode
    pub command: (u8, u8),
    /// Parameter bytes following the command pair
    pub parameters: Vec<u8>,
    /// Full wire span (marker through checksum) for hex rendering
    pub raw: Vec<u8>,
    /// Time the frame was accepted by the framer
    pub received_at: Instant,
}

impl Packet {
    /// Parse a packet from a complete wire span
    ///
    /// `span` must cover exactly one frame: marker, length byte, payload,
    /// trailing checksum. Returns `None` when the marker, declared length,
    /// or checksum do not hold; the framer turns that into resynchronization
    /// rather than an error.
    pub fn parse(span: &[u8], received_at: Instant) -> Option<Self> {
        if span.len() < MIN_PAYLOAD_LEN + FRAME_OVERHEAD {
            return None;
        }
        if span[0..2] != FRAME_MARKER {
            return None;
        }

        let declared = span[2] as usize;
        if declared < MIN_PAYLOAD_LEN || span.len() != declared + FRAME_OVERHEAD {
            return None;
        }

        let payload = &span[3..3 + declared];
        if checksum(payload) != span[3 + declared] {
            return None;
        }

        Some(Self {
            mode: payload[0],
            command: (payload[1], payload[2]),
            parameters: payload[3..].to_vec(),
            raw: span.to_vec(),
            received_at,
        })
    }

    /// Total number of bytes the frame occupied on the wire
    pub fn wire_len(&self) -> usize {
        self.raw.len()
    }
}

/// Additive complement checksum over the payload
///
/// Covers mode through the last parameter byte; the length byte and the
/// checksum byte itself are excluded.
pub fn checksum(payload: &[u8]) -> u8 {
    let sum = payload.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    0u8.wrapping_sub(sum)
}

/// Build a complete wire span for the given payload fields
///
/// The sniffer never transmits; this exists for diagnostics and tests that
/// need well-formed frames to feed back through the framer.
pub fn encode_frame(mode: u8, command: (u8, u8), parameters: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(MIN_PAYLOAD_LEN + parameters.len());
    payload.push(mode);
    payload.push(command.0);
    payload.push(command.1);
    payload.extend_from_slice(parameters);

    let mut span = Vec::with_capacity(payload.len() + FRAME_OVERHEAD);
    span.extend_from_slice(&FRAME_MARKER);
    span.push(payload.len() as u8);
    span.extend_from_slice(&payload);
    span.push(checksum(&payload));
    span
}
