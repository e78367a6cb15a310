// Dashboard controller - owns one dashboard instance and its background tasks
use crate::application::connection_manager::ConnectionManager;
use crate::application::error::DashboardError;
use crate::application::relay_api::{RelayAck, RelayApi, StreamTransport};
use crate::application::status_poller::StatusPoller;
use crate::application::subscription_service::SubscriptionService;
use crate::domain::dashboard::{new_state_handle, ActiveSubscription, DashboardSnapshot, StateHandle};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub initial_topic: String,
    pub max_records: usize,
    pub reconnect_delay: Duration,
    pub status_poll_interval: Duration,
}

/// A mounted dashboard: the stream, the status poller and the state they feed.
///
/// State is only mutated through the operations below and the two background
/// tasks; presentation reads it through `snapshot`.
pub struct DashboardController {
    state: StateHandle,
    subscriptions: SubscriptionService,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DashboardController {
    /// Start the connection manager and the status poller
    pub fn mount(
        settings: &DashboardSettings,
        relay: Arc<dyn RelayApi>,
        transport: Arc<dyn StreamTransport>,
    ) -> Self {
        let state = new_state_handle(settings.initial_topic.clone(), settings.max_records);
        let (subscription_tx, subscription_rx) =
            watch::channel(ActiveSubscription::new(settings.initial_topic.clone()));
        let cancel = CancellationToken::new();

        let manager = ConnectionManager::new(
            transport,
            state.clone(),
            subscription_rx,
            settings.reconnect_delay,
            cancel.child_token(),
        );
        let poller = StatusPoller::new(
            relay.clone(),
            state.clone(),
            settings.status_poll_interval,
            cancel.child_token(),
        );

        let tasks = vec![tokio::spawn(manager.run()), tokio::spawn(poller.run())];

        tracing::info!(
            "Dashboard mounted for topic '{}' (buffer {}, reconnect {}ms, poll {}ms)",
            settings.initial_topic,
            settings.max_records,
            settings.reconnect_delay.as_millis(),
            settings.status_poll_interval.as_millis()
        );

        Self {
            subscriptions: SubscriptionService::new(relay, state.clone(), Arc::new(subscription_tx)),
            state,
            cancel,
            tasks: Mutex::new(tasks),
        }
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn submit_topic(&self, topic: &str) -> Result<RelayAck, DashboardError> {
        self.subscriptions.submit(topic).await
    }

    pub async fn set_topic(&self, topic: &str) -> Result<(), DashboardError> {
        self.subscriptions.set_topic(topic).await
    }

    pub async fn publish(&self, topic: Option<&str>, message: &Value) -> Result<RelayAck, DashboardError> {
        self.subscriptions.publish(topic, message).await
    }

    /// Close the stream, cancel any pending reconnect and stop polling.
    /// Returns once both background tasks have exited.
    pub async fn teardown(&self) {
        self.cancel.cancel();

        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().await.drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!("Dashboard task ended abnormally: {}", e);
            }
        }

        tracing::info!("Dashboard torn down");
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &StateHandle {
        &self.state
    }
}
