//! Vendor wire message types.
//!
//! Every vendor frame is a JSON object tagged by a `$type` field. Outbound we
//! only ever send `BcStart`; inbound we only act on `BcRace`.

use serde::{Deserialize, Serialize};

/// Discriminator field name used by the vendor.
pub const TYPE_TAG: &str = "$type";

/// `$type` of the subscription request.
pub const START_TYPE: &str = "BcStart";

/// `$type` of race-update frames.
pub const RACE_TYPE: &str = "BcRace";

/// Security label the vendor expects from third-party display clients.
pub const THIRD_PARTY_TV: &str = "THIRD PARTY TV";

/// Subscription request sent once per connection, right after open.
///
/// Serializes to:
/// `{"$type":"BcStart","ClientKey":..,"ResourceId":..,"Timing":true,"Notifications":true,"Security":"THIRD PARTY TV"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest {
    #[serde(rename = "$type")]
    pub message_type: String,
    #[serde(rename = "ClientKey")]
    pub client_key: String,
    #[serde(rename = "ResourceId")]
    pub resource_id: String,
    #[serde(rename = "Timing")]
    pub timing: bool,
    #[serde(rename = "Notifications")]
    pub notifications: bool,
    #[serde(rename = "Security")]
    pub security: String,
}

impl StartRequest {
    /// Build a subscription for one track resource with timing and
    /// notifications enabled.
    pub fn new(client_key: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            message_type: START_TYPE.to_string(),
            client_key: client_key.into(),
            resource_id: resource_id.into(),
            timing: true,
            notifications: true,
            security: THIRD_PARTY_TV.to_string(),
        }
    }
}

/// Read the `$type` discriminator of a parsed frame.
///
/// Returns `None` when the frame is not an object or the tag is missing or
/// not a string.
pub fn frame_type(frame: &serde_json::Value) -> Option<&str> {
    frame.get(TYPE_TAG).and_then(|v| v.as_str())
}

/// Check whether a parsed frame is a race update.
pub fn is_race_frame(frame: &serde_json::Value) -> bool {
    frame_type(frame) == Some(RACE_TYPE)
}
