// Subscription service - Use case for switching the subscribed topic
use crate::application::error::DashboardError;
use crate::application::relay_api::{RelayAck, RelayApi};
use crate::domain::dashboard::{ActiveSubscription, StateHandle};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

pub const SUBSCRIBE_ERROR_MESSAGE: &str = "Failed to subscribe to topic";

#[derive(Clone)]
pub struct SubscriptionService {
    relay: Arc<dyn RelayApi>,
    state: StateHandle,
    subscription: Arc<watch::Sender<ActiveSubscription>>,
}

impl SubscriptionService {
    pub fn new(
        relay: Arc<dyn RelayApi>,
        state: StateHandle,
        subscription: Arc<watch::Sender<ActiveSubscription>>,
    ) -> Self {
        Self {
            relay,
            state,
            subscription,
        }
    }

    /// Ask the relay to switch topics. On success the record buffer is
    /// emptied and the stream restarts against `topic`; on failure nothing
    /// but the subscribe error changes.
    pub async fn submit(&self, topic: &str) -> Result<RelayAck, DashboardError> {
        if topic.is_empty() {
            return Err(DashboardError::EmptyTopic);
        }

        let ack = match self.relay.subscribe(topic).await {
            Ok(ack) => ack,
            Err(e) => {
                tracing::error!("Error subscribing to topic '{}': {:#}", topic, e);
                self.state.write().await.subscribe_error = Some(SUBSCRIBE_ERROR_MESSAGE.to_string());
                return Err(DashboardError::Subscribe {
                    topic: topic.to_string(),
                    source: e,
                });
            }
        };

        tracing::info!(
            "Subscription response: {}",
            ack.message().as_deref().unwrap_or("(no message)")
        );

        let mut state = self.state.write().await;
        if !state.records.is_empty() {
            tracing::debug!("Discarding {} buffered records", state.records.len());
        }
        state.records.clear();
        state.subscribe_error = None;
        self.switch_locked(&mut state.subscription, topic);

        Ok(ack)
    }

    /// Change the topic locally and restart the stream, without asking the relay
    pub async fn set_topic(&self, topic: &str) -> Result<(), DashboardError> {
        if topic.is_empty() {
            return Err(DashboardError::EmptyTopic);
        }

        let mut state = self.state.write().await;
        if state.subscription.topic == topic {
            return Ok(());
        }
        self.switch_locked(&mut state.subscription, topic);
        Ok(())
    }

    /// Publish a message through the relay, defaulting to the active topic
    pub async fn publish(&self, topic: Option<&str>, message: &Value) -> Result<RelayAck, DashboardError> {
        let topic = match topic {
            Some(t) if !t.is_empty() => t.to_string(),
            Some(_) => return Err(DashboardError::EmptyTopic),
            None => self.state.read().await.subscription.topic.clone(),
        };

        let ack = self.relay.publish(&topic, message).await?;
        tracing::debug!("Published message to '{}'", topic);
        Ok(ack)
    }

    // Caller holds the state lock, so a frame from the old session can't slip in
    // between the generation bump and the restart signal.
    fn switch_locked(&self, current: &mut ActiveSubscription, topic: &str) {
        *current = current.next(topic);
        self.subscription.send_replace(current.clone());
        tracing::info!(
            "Active topic is now '{}' (generation {})",
            current.topic,
            current.generation
        );
    }
}
