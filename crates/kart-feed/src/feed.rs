//! Reconciles vendor connection events and frames into [`SessionState`].

use crate::parser::{classify_frame, Frame, RaceUpdate};
use crate::session::SessionState;
use chrono::{DateTime, Utc};
use kart_telemetry::{FrameKind, Metrics};
use kart_ws::FeedHandler;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The single writer of [`SessionState`].
///
/// Plugged into `kart_ws::ConnectionManager` as its [`FeedHandler`].
#[derive(Debug, Clone)]
pub struct SessionFeed {
    state: Arc<SessionState>,
}

impl SessionFeed {
    pub fn new(state: Arc<SessionState>) -> Self {
        Self { state }
    }

    /// Read-only access to the state this feed writes.
    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    /// Apply one frame as of `now`. Returns the frame classification.
    ///
    /// Malformed and non-race frames leave the state untouched.
    pub fn apply_text_at(&self, text: &str, now: DateTime<Utc>) -> FrameKind {
        let frame = match classify_frame(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, len = text.len(), "Discarding malformed frame");
                Metrics::frame(FrameKind::Malformed);
                return FrameKind::Malformed;
            }
        };

        match frame {
            Frame::Race(value) => {
                let update = RaceUpdate::from_frame(&value, now);
                debug!(
                    remaining_seconds = update.remaining_seconds,
                    session_status = %update.session_status,
                    clock_source = update.clock_source.as_str(),
                    "Race update"
                );
                Metrics::session_update(update.remaining_seconds, now.timestamp_millis());
                self.state.apply(update, value, now);
                Metrics::frame(FrameKind::Race);
                FrameKind::Race
            }
            Frame::Other(message_type) => {
                debug!(%message_type, "Ignoring frame");
                Metrics::frame(FrameKind::Ignored);
                FrameKind::Ignored
            }
        }
    }
}

impl FeedHandler for SessionFeed {
    fn on_open(&self) {
        info!("Vendor feed connected");
        self.state.set_connected(true);
    }

    fn on_text(&self, text: &str) {
        self.apply_text_at(text, Utc::now());
    }

    fn on_close(&self) {
        info!("Vendor feed disconnected");
        self.state.set_connected(false);
    }
}
