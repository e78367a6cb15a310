// Status poller - refreshes the relay status snapshot on a fixed interval
use crate::application::relay_api::RelayApi;
use crate::domain::dashboard::StateHandle;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10_000);
pub const STATUS_ERROR_MESSAGE: &str = "Failed to fetch API status";

pub struct StatusPoller {
    relay: Arc<dyn RelayApi>,
    state: StateHandle,
    interval: Duration,
    cancel: CancellationToken,
    issued: u64,
    applied: Arc<AtomicU64>,
}

impl StatusPoller {
    pub fn new(
        relay: Arc<dyn RelayApi>,
        state: StateHandle,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            relay,
            state,
            interval,
            cancel,
            issued: 0,
            applied: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Poll immediately, then on every tick until cancelled.
    ///
    /// Each poll runs as its own task so a slow or hung request never holds
    /// back the schedule. Requests still in flight are aborted on cancel.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let seq = self.next_seq();
                    in_flight.spawn(poll(
                        self.relay.clone(),
                        self.state.clone(),
                        self.applied.clone(),
                        seq,
                    ));
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        tracing::warn!("Status poll task failed: {}", e);
                    }
                }
            }
        }

        if !in_flight.is_empty() {
            tracing::debug!("Aborting {} in-flight status polls", in_flight.len());
        }
        in_flight.shutdown().await;
        tracing::debug!("Status poller stopped");
    }

    #[cfg(test)]
    pub async fn poll_once(&mut self) {
        let seq = self.next_seq();
        poll(self.relay.clone(), self.state.clone(), self.applied.clone(), seq).await
    }

    fn next_seq(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }
}

// Replies can arrive out of order once requests overlap; one older than the
// last applied reply is dropped.
async fn poll(relay: Arc<dyn RelayApi>, state: StateHandle, applied: Arc<AtomicU64>, seq: u64) {
    let result = relay.fetch_status().await;

    let mut state = state.write().await;
    if applied.fetch_max(seq, Ordering::SeqCst) > seq {
        tracing::debug!("Dropping status reply #{} that arrived after a newer one", seq);
        return;
    }

    match result {
        Ok(snapshot) => {
            tracing::debug!(
                "Relay status: {:?}, topic: {:?}",
                snapshot.status,
                snapshot.iot_topic
            );
            state.status.record_success(snapshot);
        }
        Err(e) => {
            tracing::error!("Error fetching status: {:#}", e);
            state.status.record_failure(STATUS_ERROR_MESSAGE);
        }
    }
}
