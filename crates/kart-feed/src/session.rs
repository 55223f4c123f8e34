//! Shared session state.

use crate::parser::RaceUpdate;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

/// Session status before any race update, or when the vendor omits it.
pub const UNKNOWN_STATUS: &str = "UNKNOWN";

/// Point-in-time copy of the session state, as served on `/session.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub connected: bool,
    pub remaining_seconds: u64,
    pub session_status: String,
    pub last_race_message: Option<Value>,
}

#[derive(Debug)]
struct SessionRecord {
    connected: bool,
    remaining_seconds: u64,
    session_status: String,
    last_message: Option<Value>,
    last_frame_at: Option<DateTime<Utc>>,
}

/// The process-wide session record.
///
/// `connected` mirrors the upstream socket. The race fields change together
/// under one write lock, so a snapshot never mixes two frames. Mutation is
/// crate-private: [`crate::SessionFeed`] is the only writer.
#[derive(Debug)]
pub struct SessionState {
    inner: RwLock<SessionRecord>,
}

impl SessionState {
    /// Create the initial state: disconnected, `UNKNOWN`, no message.
    pub fn new(default_remaining_seconds: u64) -> Self {
        Self {
            inner: RwLock::new(SessionRecord {
                connected: false,
                remaining_seconds: default_remaining_seconds,
                session_status: UNKNOWN_STATUS.to_string(),
                last_message: None,
                last_frame_at: None,
            }),
        }
    }

    /// Copy the published fields under a single read lock.
    pub fn snapshot(&self) -> SessionSnapshot {
        let record = self.inner.read();
        SessionSnapshot {
            connected: record.connected,
            remaining_seconds: record.remaining_seconds,
            session_status: record.session_status.clone(),
            last_race_message: record.last_message.clone(),
        }
    }

    /// When the last race update was applied.
    pub fn last_frame_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().last_frame_at
    }

    pub(crate) fn set_connected(&self, connected: bool) {
        self.inner.write().connected = connected;
    }

    pub(crate) fn apply(&self, update: RaceUpdate, frame: Value, received_at: DateTime<Utc>) {
        let mut record = self.inner.write();
        record.remaining_seconds = update.remaining_seconds;
        record.session_status = update.session_status;
        record.last_message = Some(frame);
        record.last_frame_at = Some(received_at);
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(0)
    }
}
