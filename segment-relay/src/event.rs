//! Segment webhook payload types.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// Segment call type.
///
/// Only `track` and `identify` are accepted; anything else fails decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Track,
    Identify,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Track => "track",
            EventType::Identify => "identify",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded Segment webhook body.
///
/// Unknown fields (context, properties, timestamps) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookPayload {
    /// Segment call type
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Free-text event name, matched verbatim against the allow-list
    pub event: String,
    /// Segment user id
    #[serde(default, rename = "userId", deserialize_with = "null_as_empty")]
    pub user_id: String,
    /// Channel the event originated from (server, browser, mobile)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub channel: String,
}

impl WebhookPayload {
    /// Decode a payload from the raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

/// Segment sends `null` for anonymous users; treat it like an absent field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_track() {
        let body = br#"{
            "type": "track",
            "event": "Viewed Dashboard",
            "userId": "user-42",
            "channel": "browser",
            "properties": {"plan": "pro"}
        }"#;

        let payload = WebhookPayload::from_slice(body).unwrap();
        assert_eq!(payload.event_type, EventType::Track);
        assert_eq!(payload.event, "Viewed Dashboard");
        assert_eq!(payload.user_id, "user-42");
        assert_eq!(payload.channel, "browser");
    }

    #[test]
    fn test_decode_identify_minimal() {
        let payload = WebhookPayload::from_slice(br#"{"type":"identify","event":""}"#).unwrap();

        assert_eq!(payload.event_type, EventType::Identify);
        assert_eq!(payload.event, "");
        assert_eq!(payload.user_id, "");
        assert_eq!(payload.channel, "");
    }

    #[test]
    fn test_decode_null_user_id() {
        let payload =
            WebhookPayload::from_slice(br#"{"type":"track","event":"X","userId":null,"channel":null}"#)
                .unwrap();

        assert_eq!(payload.user_id, "");
        assert_eq!(payload.channel, "");
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let err = WebhookPayload::from_slice(br#"{"type":"bogus","event":"X"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown variant `bogus`"));
    }

    #[test]
    fn test_decode_requires_type_and_event() {
        assert!(WebhookPayload::from_slice(br#"{"event":"X"}"#).is_err());
        assert!(WebhookPayload::from_slice(br#"{"type":"track"}"#).is_err());
        assert!(WebhookPayload::from_slice(b"not json").is_err());
    }

    #[test]
    fn test_event_type_display() {
        assert_eq!(EventType::Track.to_string(), "track");
        assert_eq!(EventType::Identify.to_string(), "identify");
    }
}
