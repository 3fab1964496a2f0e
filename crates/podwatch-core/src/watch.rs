//! The watch loop
//!
//! One `StreamDecoder` per tapped direction drives a framer over its byte
//! source and turns accepted frames into transcript lines; the `Watcher`
//! runs both on their own threads and owns the cooperative shutdown
//! handshake.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::protocol::{ByteSource, FrameResult, Framer, Packet, SnifferError};
use crate::transcript::{discarded_line, DecodedEvent, Direction, OutputFormat, TranscriptSink};

/// Binds one framer to one labeled conversation direction
pub struct StreamDecoder<S: ByteSource> {
    direction: Direction,
    source: S,
    framer: Framer,
    sink: Arc<TranscriptSink>,
    format: OutputFormat,
    /// Rejected bytes accumulate here and flush as one diagnostic line
    discarded: Vec<u8>,
    last_accepted: Option<Instant>,
}

impl<S: ByteSource> StreamDecoder<S> {
    /// Create a decoder for one direction of the conversation
    pub fn new(
        direction: Direction,
        source: S,
        sink: Arc<TranscriptSink>,
        format: OutputFormat,
    ) -> Self {
        Self {
            direction,
            source,
            framer: Framer::new(),
            sink,
            format,
            discarded: Vec::new(),
            last_accepted: None,
        }
    }

    /// Pump the byte source until shutdown or source failure
    ///
    /// Read timeouts are liveness polls: the loop re-checks the shutdown
    /// flag once per iteration and otherwise keeps waiting. A hard source
    /// failure terminates this decoder only; the sibling direction keeps
    /// capturing.
    pub fn run(mut self, shutdown: &AtomicBool) -> Result<(), SnifferError> {
        tracing::info!(
            direction = self.direction.arrow(),
            source = %self.source.describe(),
            "capture started"
        );

        let result = loop {
            if shutdown.load(Ordering::Relaxed) {
                break Ok(());
            }
            match self.source.read_one() {
                Ok(Some(byte)) => self.feed(byte),
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(
                        direction = self.direction.arrow(),
                        error = %e,
                        "byte source failed"
                    );
                    break Err(e);
                }
            }
        };

        // Shutdown must not swallow a buffered noise run.
        self.flush_discarded();
        self.source.close();
        tracing::info!(direction = self.direction.arrow(), "capture stopped");
        result
    }

    /// Feed one byte through the framer and emit whatever completes
    fn feed(&mut self, byte: u8) {
        match self.framer.feed(byte) {
            FrameResult::Incomplete => {}
            FrameResult::Discarded(b) => self.discarded.push(b),
            FrameResult::Frame(packet) => {
                self.flush_discarded();
                self.emit(&packet);
            }
        }
    }

    fn emit(&mut self, packet: &Packet) {
        let delay_ms = match self.last_accepted {
            Some(prev) => packet
                .received_at
                .saturating_duration_since(prev)
                .as_millis() as u64,
            None => 0,
        };
        self.last_accepted = Some(packet.received_at);

        let event = DecodedEvent::decode(self.direction, packet, delay_ms);
        tracing::debug!(
            direction = self.direction.arrow(),
            mode = event.mode,
            command = ?event.command,
            wire_len = packet.wire_len(),
            "frame accepted"
        );
        self.sink.write_line(&event.render(self.format));
    }

    /// Emit any buffered noise run as a single diagnostic line
    fn flush_discarded(&mut self) {
        if self.discarded.is_empty() {
            return;
        }
        let line = discarded_line(self.direction, &self.discarded, self.format);
        self.sink.write_line(&line);
        self.discarded.clear();
    }
}

/// Runs both directions of a capture session
pub struct Watcher {
    sink: Arc<TranscriptSink>,
    shutdown: Arc<AtomicBool>,
    format: OutputFormat,
}

impl Watcher {
    /// Create a watcher emitting text transcript lines
    pub fn new(sink: Arc<TranscriptSink>, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            sink,
            shutdown,
            format: OutputFormat::Text,
        }
    }

    /// Select the transcript output format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Run one decoder per direction until shutdown
    ///
    /// Blocks until BOTH decoder threads have acknowledged termination, so
    /// no buffered diagnostic line is lost on exit. A decoder that dies
    /// early (source failure, internal fault) is contained to its thread.
    pub fn run<L, R>(&self, request: L, response: R) -> Result<(), SnifferError>
    where
        L: ByteSource + 'static,
        R: ByteSource + 'static,
    {
        let request_handle = self.spawn("watch-request", Direction::Request, request)?;
        let response_handle = self.spawn("watch-response", Direction::Response, response)?;

        for (side, handle) in [("request", request_handle), ("response", response_handle)] {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(side, error = %e, "decoder terminated early");
                }
                Err(_) => {
                    tracing::error!(side, "decoder thread panicked");
                }
            }
        }
        Ok(())
    }

    fn spawn<S: ByteSource + 'static>(
        &self,
        name: &str,
        direction: Direction,
        source: S,
    ) -> Result<thread::JoinHandle<Result<(), SnifferError>>, SnifferError> {
        let decoder = StreamDecoder::new(direction, source, Arc::clone(&self.sink), self.format);
        let shutdown = Arc::clone(&self.shutdown);

        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || decoder.run(&shutdown))
            .map_err(SnifferError::IoError)
    }
}
