//! # Radio Receive Loop
//!
//! Drives a [`Packet`] through the capacity protocol against a
//! [`RadioSource`], converts it, and hands the resulting frames to the
//! registered frame handlers.
//!
//! ## Usage
//!
//! ```rust
//! use wmbus_radio::config::ReceiverConfig;
//! use wmbus_radio::wmbus::receiver::{Capture, Receiver, ReplayRadio};
//!
//! let radio = ReplayRadio::new(vec![Capture::new(vec![0x54, 0xCD, 0x0A], -70)], 16);
//! let mut receiver = Receiver::new(radio, ReceiverConfig::default());
//! receiver.add_frame_handler(|frame| {
//!     print!("{}", frame.as_rtlwmbus());
//!     frame.mark_as_handled();
//! });
//! let stats = receiver.run().unwrap();
//! assert_eq!(stats.transmissions, 1);
//! assert_eq!(stats.packets_dropped, 1); // truncated capture
//! ```

use std::collections::VecDeque;
use std::io::BufRead;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::ReceiverConfig;
use crate::error::{Result, WMBusError};
use crate::logging::{DiagnosticSink, LogSink};
use crate::util::hex::decode_hex;
use crate::wmbus::frame::Frame;
use crate::wmbus::packet::Packet;

/// Byte source for one radio.
pub trait RadioSource {
    /// Wait for the next transmission. `Ok(false)` once the source is exhausted.
    fn next_transmission(&mut self) -> Result<bool>;

    /// Copy received bytes of the current transmission into `buf`.
    ///
    /// Returns the number of bytes written; 0 means nothing more arrived.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Signal strength of the current transmission in dBm
    fn rssi(&mut self) -> i8;
}

/// One recorded transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub bytes: Vec<u8>,
    pub rssi: i8,
}

impl Capture {
    pub fn new(bytes: Vec<u8>, rssi: i8) -> Self {
        Self { bytes, rssi }
    }

    /// Parse a capture line `<hex>[ <rssi>]`.
    ///
    /// Blank lines and `#` comments yield `None`.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut fields = line.split_whitespace();
        let hex = fields.next().unwrap_or_default();
        let bytes = decode_hex(hex).map_err(|e| WMBusError::InvalidCapture {
            line: line_no,
            message: e.to_string(),
        })?;
        let rssi = match fields.next() {
            Some(value) => value.parse::<i8>().map_err(|e| WMBusError::InvalidCapture {
                line: line_no,
                message: format!("bad RSSI '{value}': {e}"),
            })?,
            None => 0,
        };
        if fields.next().is_some() {
            return Err(WMBusError::InvalidCapture {
                line: line_no,
                message: "trailing fields".into(),
            });
        }

        Ok(Some(Self::new(bytes, rssi)))
    }
}

/// In-memory radio replaying recorded transmissions.
#[derive(Debug)]
pub struct ReplayRadio {
    pending: VecDeque<Capture>,
    current: Option<Capture>,
    pos: usize,
    chunk_size: usize,
}

impl ReplayRadio {
    /// Replay `captures`, delivering at most `chunk_size` bytes per read.
    pub fn new(captures: impl IntoIterator<Item = Capture>, chunk_size: usize) -> Self {
        Self {
            pending: captures.into_iter().collect(),
            current: None,
            pos: 0,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Read capture lines from `reader`.
    pub fn from_reader(reader: impl BufRead, chunk_size: usize) -> Result<Self> {
        let mut captures = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            if let Some(capture) = Capture::parse_line(&line?, idx + 1)? {
                captures.push(capture);
            }
        }
        Ok(Self::new(captures, chunk_size))
    }

    /// Transmissions not yet started
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl RadioSource for ReplayRadio {
    fn next_transmission(&mut self) -> Result<bool> {
        self.current = self.pending.pop_front();
        self.pos = 0;
        Ok(self.current.is_some())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let Some(capture) = &self.current else {
            return Ok(0);
        };
        let available = &capture.bytes[self.pos..];
        let n = available.len().min(buf.len()).min(self.chunk_size);
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }

    fn rssi(&mut self) -> i8 {
        self.current.as_ref().map_or(0, |c| c.rssi)
    }
}

/// Counters kept by a [`Receiver`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverStats {
    pub transmissions: u64,
    pub frames_decoded: u64,
    pub packets_dropped: u64,
    pub frames_unhandled: u64,
}

type FrameHandler = Box<dyn FnMut(&Frame)>;

/// Receive loop for one radio.
pub struct Receiver<R, S = LogSink> {
    radio: R,
    sink: S,
    config: ReceiverConfig,
    handlers: Vec<FrameHandler>,
    stats: ReceiverStats,
}

impl<R: RadioSource> Receiver<R, LogSink> {
    /// Create a receiver that logs drops through the `log` facade.
    pub fn new(radio: R, config: ReceiverConfig) -> Self {
        let sink = LogSink::new(config.log_window_ms, config.log_cap);
        Self::with_sink(radio, config, sink)
    }
}

impl<R: RadioSource, S: DiagnosticSink> Receiver<R, S> {
    /// Create a receiver reporting conversions to `sink`.
    pub fn with_sink(radio: R, config: ReceiverConfig, sink: S) -> Self {
        Self {
            radio,
            sink,
            config,
            handlers: Vec::new(),
            stats: ReceiverStats::default(),
        }
    }

    /// Register a handler called for every decoded frame.
    ///
    /// Handlers call [`Frame::mark_as_handled`] when they consumed the frame.
    pub fn add_frame_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&Frame) + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Assemble and convert the current transmission.
    ///
    /// Reading stops once the packet reaches its expected size, when the
    /// radio goes quiet, when the size cannot be told from the preamble, or
    /// after `max_reads_per_packet` reads.
    pub fn receive_packet(&mut self) -> Result<Option<Frame>> {
        let mut packet = Packet::new();
        let mut reads = 0;

        while packet.rx_capacity() > 0 {
            if reads == self.config.max_reads_per_packet {
                debug!("Packet stalled after {reads} reads ({} bytes)", packet.len());
                break;
            }
            let received = self.radio.read(packet.rx_region())?;
            packet.commit(received);
            reads += 1;

            if received == 0 {
                break;
            }
            packet.calculate_payload_size();
        }

        packet.set_rssi(self.radio.rssi());
        self.stats.transmissions += 1;

        let frame = packet.convert_to_frame_with(&mut self.sink);
        match frame {
            Some(_) => self.stats.frames_decoded += 1,
            None => self.stats.packets_dropped += 1,
        }
        Ok(frame)
    }

    /// Hand a frame to every registered handler.
    pub fn dispatch(&mut self, frame: Frame) -> Arc<Frame> {
        let frame = Arc::new(frame);
        for handler in self.handlers.iter_mut() {
            handler(&frame);
        }

        if frame.handlers_count() == 0 {
            self.stats.frames_unhandled += 1;
            if self.config.warn_unhandled {
                warn!("Telegram not handled by any handler: {}", frame.as_hex());
            }
        }
        frame
    }

    /// Receive until the radio is exhausted.
    pub fn run(&mut self) -> Result<ReceiverStats> {
        while self.radio.next_transmission()? {
            if let Some(frame) = self.receive_packet()? {
                self.dispatch(frame);
            }
        }

        info!(
            "Receiver done: {} transmissions, {} frames, {} dropped, {} unhandled",
            self.stats.transmissions,
            self.stats.frames_decoded,
            self.stats.packets_dropped,
            self.stats.frames_unhandled
        );
        Ok(self.stats)
    }

    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }
}
