//! Upstream event envelope and the accepted-type filter.

use serde::Deserialize;

/// Event types that represent a completed payment and are worth relaying.
/// Everything else is acknowledged and dropped so the processor does not
/// retry deliveries we will never act on.
pub const ACCEPTED_EVENT_TYPES: &[&str] = &[
    "checkout.session.completed",
    "payment_intent.succeeded",
    "invoice.paid",
];

/// A raw processor event, deserialized only after its signature checked out.
///
/// The envelope is stable across event types; `data.object` is whatever
/// shape the upstream attached for this `type` and is left as opaque JSON
/// for the normalizer's priority chains to pick over.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default)]
    pub id: String,

    /// Unix seconds at which the upstream created the event.
    #[serde(default)]
    pub created: Option<i64>,

    #[serde(default)]
    pub data: EventData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    /// Shape varies by event type; absent becomes JSON null.
    #[serde(default)]
    pub object: serde_json::Value,
}

impl RawEvent {
    /// Whether this event should be normalized and dispatched.
    pub fn is_accepted(&self) -> bool {
        ACCEPTED_EVENT_TYPES.contains(&self.event_type.as_str())
    }
}
