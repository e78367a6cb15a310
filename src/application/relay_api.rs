// Relay seams - HTTP endpoints and the streaming connection
use crate::domain::status::StatusSnapshot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Directive sent once right after the stream opens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribeDirective {
    pub action: String,
    pub topic: String,
}

impl SubscribeDirective {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            action: "subscribe".to_string(),
            topic: topic.into(),
        }
    }
}

/// Informational reply to a subscribe or publish request. Any JSON body is
/// accepted; only `message` is ever looked at, and only for logging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelayAck {
    pub body: Value,
}

impl RelayAck {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// The `message` field as text, whatever its JSON type
    pub fn message(&self) -> Option<String> {
        match self.body.get("message")? {
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[async_trait]
pub trait RelayApi: Send + Sync {
    /// Fetch the relay status snapshot
    async fn fetch_status(&self) -> anyhow::Result<StatusSnapshot>;

    /// Ask the relay to switch its broker subscription
    async fn subscribe(&self, topic: &str) -> anyhow::Result<RelayAck>;

    /// Publish a message to a broker topic through the relay
    async fn publish(&self, topic: &str, message: &Value) -> anyhow::Result<RelayAck>;
}

#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Open a new streaming connection to the relay
    async fn connect(&self) -> anyhow::Result<Box<dyn StreamSession>>;
}

#[async_trait]
pub trait StreamSession: Send {
    async fn send_text(&mut self, text: String) -> anyhow::Result<()>;

    /// Next inbound frame; `None` once the connection has closed
    async fn next_frame(&mut self) -> Option<anyhow::Result<String>>;

    async fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_directive_wire_format() {
        let directive = SubscribeDirective::new("test/topic");
        assert_eq!(
            serde_json::to_string(&directive).unwrap(),
            r#"{"action":"subscribe","topic":"test/topic"}"#
        );
    }

    #[test]
    fn test_ack_tolerates_any_body() {
        let ack: RelayAck = serde_json::from_str(r#"{"message":"Subscribed to topic: a"}"#).unwrap();
        assert_eq!(ack.message().as_deref(), Some("Subscribed to topic: a"));

        let ack: RelayAck = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert_eq!(ack.message(), None);

        let ack: RelayAck = serde_json::from_str(r#"{"message":{"text":"Subscribed"}}"#).unwrap();
        assert_eq!(ack.message().as_deref(), Some(r#"{"text":"Subscribed"}"#));

        let ack: RelayAck = serde_json::from_str(r#"["a",5]"#).unwrap();
        assert_eq!(ack.message(), None);
        assert_eq!(serde_json::to_string(&ack).unwrap(), r#"["a",5]"#);
    }
}
