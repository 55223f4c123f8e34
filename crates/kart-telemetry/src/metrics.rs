//! Prometheus metrics for the kart relay.
//!
//! Covers:
//! - Upstream connection state and reconnects
//! - Inbound frame classification
//! - Published session state
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! means duplicate metric names, a startup bug. These panics only occur during
//! static initialization, never at runtime.

use crate::error::TelemetryResult;
use once_cell::sync::Lazy;
use prometheus::{
    register_gauge, register_int_counter, register_int_counter_vec, register_int_gauge, Encoder,
    Gauge, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};

/// Upstream connection state (1 = connected, 0 = disconnected).
pub static FEED_CONNECTED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "kart_feed_connected",
        "Vendor WebSocket connection state (1=connected)"
    )
    .unwrap()
});

/// Total reconnect attempts.
pub static FEED_RECONNECT_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "kart_feed_reconnect_total",
        "Total vendor WebSocket reconnection attempts"
    )
    .unwrap()
});

/// Inbound frames by classification.
/// Labels: kind (race/ignored/malformed)
pub static FEED_FRAMES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "kart_feed_frames_total",
        "Inbound vendor frames by classification",
        &["kind"]
    )
    .unwrap()
});

/// Remaining seconds currently published.
pub static SESSION_REMAINING_SECONDS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "kart_session_remaining_seconds",
        "Remaining session time currently published"
    )
    .unwrap()
});

/// Unix timestamp of the last state-updating frame.
pub static FEED_LAST_FRAME_TIMESTAMP: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "kart_feed_last_frame_timestamp_seconds",
        "Unix time of the last race-update frame"
    )
    .unwrap()
});

/// Classification of an inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// `BcRace` frame applied to session state.
    Race,
    /// Well-formed frame of another type.
    Ignored,
    /// Unparsable frame or missing `$type`.
    Malformed,
}

impl FrameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameKind::Race => "race",
            FrameKind::Ignored => "ignored",
            FrameKind::Malformed => "malformed",
        }
    }
}

/// Metrics helper for recording values.
pub struct Metrics;

impl Metrics {
    /// Record connection state.
    pub fn feed_connected(connected: bool) {
        FEED_CONNECTED.set(i64::from(connected));
    }

    /// Record a reconnect attempt.
    pub fn feed_reconnect() {
        FEED_RECONNECT_TOTAL.inc();
    }

    /// Record an inbound frame.
    pub fn frame(kind: FrameKind) {
        FEED_FRAMES_TOTAL.with_label_values(&[kind.as_str()]).inc();
    }

    /// Record an applied race update.
    pub fn session_update(remaining_seconds: u64, frame_timestamp_ms: i64) {
        SESSION_REMAINING_SECONDS.set(i64::try_from(remaining_seconds).unwrap_or(i64::MAX));
        FEED_LAST_FRAME_TIMESTAMP.set(frame_timestamp_ms as f64 / 1000.0);
    }

    /// Render all registered metrics in the Prometheus text format.
    pub fn gather_text() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&prometheus::gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
