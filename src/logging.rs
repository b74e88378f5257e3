//! # Logging
//!
//! Logger initialization and the diagnostic sink that packet conversion
//! reports to. The core never logs rejections on its own; it hands them to
//! a [`DiagnosticSink`], and [`LogSink`] is the one that writes to the `log`
//! facade.

use log::{debug, error, info, log_enabled, warn, Level, LevelFilter, SetLoggerError};

use crate::constants::{LOG_THROTTLE_CAP, LOG_THROTTLE_WINDOW_MS};
use crate::error::DropReason;
use crate::util::logging::LogThrottle;
use crate::wmbus::frame::Frame;

/// Initializes the logger with the `env_logger` crate (honors `RUST_LOG`).
pub fn init_logger() {
    env_logger::init();
}

/// Initializes `env_logger` with a default level, still overridable by `RUST_LOG`.
///
/// Fails if a logger is already installed.
pub fn init_logger_with_level(level: LevelFilter) -> Result<(), SetLoggerError> {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
}

/// Logs an error message.
pub fn log_error(message: &str) {
    if log_enabled!(Level::Error) {
        error!("{message}");
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

/// Receives the outcome of every packet conversion.
pub trait DiagnosticSink {
    /// A packet was discarded.
    fn packet_dropped(&mut self, reason: &DropReason);

    /// A packet was converted into a frame.
    fn frame_decoded(&mut self, _frame: &Frame) {}
}

/// Sink that forwards to the `log` facade, throttling drop warnings.
#[derive(Debug)]
pub struct LogSink {
    throttle: LogThrottle,
}

impl LogSink {
    pub fn new(window_ms: u64, cap: u32) -> Self {
        Self {
            throttle: LogThrottle::new(window_ms, cap),
        }
    }

    /// Drop warnings swallowed by the throttle
    pub fn suppressed(&self) -> u64 {
        self.throttle.suppressed()
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(LOG_THROTTLE_WINDOW_MS, LOG_THROTTLE_CAP)
    }
}

impl DiagnosticSink for LogSink {
    fn packet_dropped(&mut self, reason: &DropReason) {
        if self.throttle.allow() {
            warn!("Drop packet: {reason}");
        } else {
            debug!("Drop packet: {reason}");
        }
    }

    fn frame_decoded(&mut self, frame: &Frame) {
        debug!(
            "Frame {} format {} ({} bytes, RSSI {} dBm)",
            frame.link_mode(),
            frame.format(),
            frame.size(),
            frame.rssi()
        );
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn packet_dropped(&mut self, _reason: &DropReason) {}
}

/// Sink that keeps every drop reason, for inspection after a run.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub dropped: Vec<DropReason>,
    pub decoded: usize,
}

impl DiagnosticSink for RecordingSink {
    fn packet_dropped(&mut self, reason: &DropReason) {
        self.dropped.push(reason.clone());
    }

    fn frame_decoded(&mut self, _frame: &Frame) {
        self.decoded += 1;
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn packet_dropped(&mut self, reason: &DropReason) {
        (**self).packet_dropped(reason);
    }

    fn frame_decoded(&mut self, frame: &Frame) {
        (**self).frame_decoded(frame);
    }
}
