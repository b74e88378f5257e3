//! # Logging Utilities
//!
//! Rate limiting and hex-dump helpers for radio diagnostics. A noisy channel
//! can produce hundreds of undecodable packets per minute; the throttle keeps
//! those from drowning the useful log lines.
//!
//! ```rust
//! use wmbus_radio::util::logging::LogThrottle;
//!
//! let mut throttle = LogThrottle::new(1000, 5); // 5 messages per second
//! if throttle.allow() {
//!     log::warn!("Drop packet: DLL CRC check failed");
//! }
//! ```

use std::time::Instant;

use super::hex::format_hex_compact;

/// Throttling structure for rate-limiting log messages
#[derive(Debug)]
pub struct LogThrottle {
    /// Time window for throttling (in milliseconds)
    window_ms: u64,
    /// Maximum messages allowed per window
    cap: u32,
    /// Current message count in window
    count: u32,
    /// Messages suppressed since the last reset
    suppressed: u64,
    /// Start time of current window
    t0: Instant,
}

impl LogThrottle {
    /// Create new throttle with time window and message cap
    pub fn new(window_ms: u64, cap: u32) -> Self {
        Self {
            window_ms,
            cap,
            count: 0,
            suppressed: 0,
            t0: Instant::now(),
        }
    }

    /// Check if logging is allowed (resets counter after window expires)
    ///
    /// Returns `true` if the message should be logged, `false` if it
    /// should be throttled.
    pub fn allow(&mut self) -> bool {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(self.t0).as_millis() as u64;

        if elapsed_ms > self.window_ms {
            self.t0 = now;
            self.count = 0;
        }

        self.count = self.count.saturating_add(1);
        let allowed = self.count <= self.cap;
        if !allowed {
            self.suppressed += 1;
        }
        allowed
    }

    /// Number of messages swallowed so far
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }
}

/// Log a byte buffer at trace level with a short label
pub fn log_frame_hex(label: &str, data: &[u8]) {
    if log::log_enabled!(log::Level::Trace) {
        log::trace!("{label} ({} bytes): {}", data.len(), format_hex_compact(data));
    }
}
