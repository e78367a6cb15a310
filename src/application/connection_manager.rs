// Connection manager - keeps one live stream open for the active topic
use crate::application::relay_api::{StreamSession, StreamTransport, SubscribeDirective};
use crate::domain::dashboard::{ActiveSubscription, ConnectionState, StateHandle};
use crate::domain::telemetry::TelemetryRecord;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Why a stream session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// Transport closed or failed; reconnect after the fixed delay
    Closed,
    /// Active subscription changed; reopen right away
    Restart,
    /// Dashboard torn down
    Cancelled,
}

pub struct ConnectionManager {
    transport: Arc<dyn StreamTransport>,
    state: StateHandle,
    subscription: watch::Receiver<ActiveSubscription>,
    reconnect_delay: Duration,
    cancel: CancellationToken,
}

impl ConnectionManager {
    pub fn new(
        transport: Arc<dyn StreamTransport>,
        state: StateHandle,
        subscription: watch::Receiver<ActiveSubscription>,
        reconnect_delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            state,
            subscription,
            reconnect_delay,
            cancel,
        }
    }

    /// Run until the cancellation token fires.
    ///
    /// Only one session is ever open: a subscription change closes the current
    /// session (or abandons a pending reconnect wait) before the next one opens.
    pub async fn run(mut self) {
        loop {
            let active = self.subscription.borrow_and_update().clone();

            match self.run_session(&active).await {
                SessionEnd::Cancelled => break,
                SessionEnd::Restart => {
                    tracing::info!("Subscription changed, restarting stream");
                    continue;
                }
                SessionEnd::Closed => {}
            }

            tracing::debug!(
                "Reconnecting in {}ms",
                self.reconnect_delay.as_millis()
            );

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                changed = self.subscription.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    tracing::info!("Subscription changed while disconnected, reconnecting now");
                }
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        self.state.write().await.connection = ConnectionState::Disconnected;
        tracing::debug!("Connection manager stopped");
    }

    async fn run_session(&mut self, active: &ActiveSubscription) -> SessionEnd {
        tracing::debug!("Opening stream for topic '{}'", active.topic);

        let connected = tokio::select! {
            _ = self.cancel.cancelled() => return SessionEnd::Cancelled,
            changed = self.subscription.changed() => {
                return if changed.is_ok() { SessionEnd::Restart } else { SessionEnd::Cancelled };
            }
            result = self.transport.connect() => result,
        };

        let mut session = match connected {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Stream connection failed: {:#}", e);
                return SessionEnd::Closed;
            }
        };

        let end = match self.send_directive(session.as_mut(), &active.topic).await {
            Ok(()) => {
                self.state.write().await.connection = ConnectionState::Connected;
                tracing::info!("Stream connected, subscribed to '{}'", active.topic);
                self.pump(session.as_mut(), active.generation).await
            }
            Err(e) => {
                tracing::warn!("Failed to send subscribe directive: {:#}", e);
                SessionEnd::Closed
            }
        };

        session.close().await;
        self.state.write().await.connection = ConnectionState::Disconnected;
        tracing::info!("Stream disconnected");

        end
    }

    async fn send_directive(
        &self,
        session: &mut dyn StreamSession,
        topic: &str,
    ) -> anyhow::Result<()> {
        let directive = serde_json::to_string(&SubscribeDirective::new(topic))?;
        session.send_text(directive).await
    }

    async fn pump(&mut self, session: &mut dyn StreamSession, generation: u64) -> SessionEnd {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return SessionEnd::Cancelled,
                changed = self.subscription.changed() => {
                    return if changed.is_ok() { SessionEnd::Restart } else { SessionEnd::Cancelled };
                }
                frame = session.next_frame() => match frame {
                    Some(Ok(text)) => self.handle_frame(&text, generation).await,
                    Some(Err(e)) => {
                        tracing::warn!("Stream error: {:#}", e);
                        return SessionEnd::Closed;
                    }
                    None => return SessionEnd::Closed,
                },
            }
        }
    }

    async fn handle_frame(&self, text: &str, generation: u64) {
        match TelemetryRecord::parse_frame(text) {
            Ok(record) => {
                let mut state = self.state.write().await;
                if state.accept_record(generation, record) {
                    tracing::trace!(
                        "Buffered record ({}/{})",
                        state.records.len(),
                        state.records.capacity()
                    );
                } else {
                    tracing::debug!("Dropping record from superseded subscription");
                }
            }
            Err(e) => {
                tracing::warn!("Dropping malformed frame: {}", e);
            }
        }
    }
}
