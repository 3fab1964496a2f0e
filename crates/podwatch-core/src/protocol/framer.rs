//! Stream framing and resynchronization
//!
//! Reassembles discrete frames out of a raw byte feed that may start
//! mid-frame, lose bytes, or carry line noise. Recovery is deliberately
//! minimal-loss: any rejection evicts exactly one byte from the front of
//! the buffer and the search restarts from the shortened buffer, so a
//! spurious or shifted marker match costs as little data as possible.

use std::time::Instant;

use super::{Packet, FRAME_MARKER, FRAME_OVERHEAD, MIN_PAYLOAD_LEN};

/// Outcome of feeding one byte to the framer
#[derive(Debug)]
pub enum FrameResult {
    /// No complete frame yet; keep feeding
    Incomplete,
    /// A validated frame was consumed from the buffer
    Frame(Packet),
    /// The oldest buffered byte was rejected as noise
    Discarded(u8),
}

/// Per-stream resynchronizing frame assembler
///
/// Each capture direction owns one `Framer` exclusively. The buffer never
/// retains a fully validated frame: a frame is handed out the same step it
/// validates.
#[derive(Debug, Default)]
pub struct Framer {
    buffer: Vec<u8>,
}

impl Framer {
    /// Create an empty framer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Number of bytes currently buffered
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Feed one byte and advance the frame search a single step
    ///
    /// At most one eviction happens per feed; garbage ahead of a valid
    /// frame drains one byte per subsequent call until the marker reaches
    /// the front of the buffer.
    pub fn feed(&mut self, byte: u8) -> FrameResult {
        self.buffer.push(byte);

        // A frame search needs marker, length byte, and at least one more
        // byte in hand before anything can be judged.
        if self.buffer.len() < FRAME_OVERHEAD {
            return FrameResult::Incomplete;
        }

        if self.buffer[0..2] != FRAME_MARKER {
            return FrameResult::Discarded(self.evict());
        }

        let declared = self.buffer[2] as usize;
        if declared < MIN_PAYLOAD_LEN {
            // Too short to hold mode + command pair: spurious marker match.
            return FrameResult::Discarded(self.evict());
        }

        let span_len = declared + FRAME_OVERHEAD;
        if self.buffer.len() < span_len {
            return FrameResult::Incomplete;
        }

        match Packet::parse(&self.buffer[..span_len], Instant::now()) {
            Some(packet) => {
                self.buffer.drain(..span_len);
                FrameResult::Frame(packet)
            }
            None => FrameResult::Discarded(self.evict()),
        }
    }

    fn evict(&mut self) -> u8 {
        self.buffer.remove(0)
    }
}
