//! Segment request payloads

use serde::Serialize;
use serde_json::{Map, Value};

/// A `track` call: one user did one thing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEvent {
    pub user_id: String,
    pub event: String,
    pub properties: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<EventContext>,
    /// ISO-8601 UTC, `Z` suffix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Request context; only traits are set by this tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventContext {
    pub traits: Map<String, Value>,
}

/// Batch entry: the event plus the call type the batch endpoint needs
#[derive(Debug, Serialize)]
struct BatchItem<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    event: &'a TrackEvent,
}

/// Body of `POST /v1/batch`
#[derive(Debug, Serialize)]
pub struct BatchPayload<'a> {
    batch: Vec<BatchItem<'a>>,
}

impl<'a> BatchPayload<'a> {
    pub fn new(events: &'a [TrackEvent]) -> Self {
        Self {
            batch: events
                .iter()
                .map(|event| BatchItem {
                    kind: "track",
                    event,
                })
                .collect(),
        }
    }
}
