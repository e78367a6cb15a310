// Relay status domain model
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of the relay's status endpoint. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iot_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_clients: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What the status card shows: last good snapshot, plus poll progress and error
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub snapshot: Option<StatusSnapshot>,
    pub loading: bool,
    pub error: Option<String>,
}

impl StatusView {
    pub fn record_success(&mut self, snapshot: StatusSnapshot) {
        self.snapshot = Some(snapshot);
        self.loading = false;
        self.error = None;
    }

    /// Keeps the previous snapshot
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}

impl Default for StatusView {
    fn default() -> Self {
        Self {
            snapshot: None,
            loading: true,
            error: None,
        }
    }
}
