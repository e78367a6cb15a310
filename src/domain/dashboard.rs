// Dashboard domain model - state owned by one dashboard instance
use super::record_buffer::RecordBuffer;
use super::status::StatusView;
use super::telemetry::{ChartData, TelemetryRecord};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to one dashboard's state
pub type StateHandle = Arc<RwLock<DashboardState>>;

pub fn new_state_handle(topic: impl Into<String>, max_records: usize) -> StateHandle {
    Arc::new(RwLock::new(DashboardState::new(topic, max_records)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connected => write!(f, "Connected"),
        }
    }
}

/// The topic the stream should be subscribed to.
///
/// `generation` increases on every topic change or restart request, so a
/// stream session can tell whether it still serves the active subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveSubscription {
    pub topic: String,
    pub generation: u64,
}

impl ActiveSubscription {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            generation: 0,
        }
    }

    pub fn next(&self, topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            generation: self.generation + 1,
        }
    }
}

#[derive(Debug)]
pub struct DashboardState {
    pub subscription: ActiveSubscription,
    pub connection: ConnectionState,
    pub records: RecordBuffer,
    pub status: StatusView,
    pub subscribe_error: Option<String>,
}

impl DashboardState {
    pub fn new(topic: impl Into<String>, max_records: usize) -> Self {
        Self {
            subscription: ActiveSubscription::new(topic),
            connection: ConnectionState::Disconnected,
            records: RecordBuffer::new(max_records),
            status: StatusView::default(),
            subscribe_error: None,
        }
    }

    /// Buffer a record unless it comes from a session opened for an older subscription
    pub fn accept_record(&mut self, generation: u64, record: TelemetryRecord) -> bool {
        if generation != self.subscription.generation {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            topic: self.subscription.topic.clone(),
            connection: self.connection,
            records: self.records.to_vec(),
            status: self.status.clone(),
            subscribe_error: self.subscribe_error.clone(),
        }
    }
}

/// Read-only copy of the dashboard state handed to presentation
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub topic: String,
    pub connection: ConnectionState,
    pub records: Vec<TelemetryRecord>,
    pub status: StatusView,
    pub subscribe_error: Option<String>,
}

impl DashboardSnapshot {
    pub fn chart(&self) -> ChartData {
        ChartData::from_records(&self.records)
    }

    pub fn raw_records(&self) -> Vec<Value> {
        self.records.iter().map(|r| r.raw.clone()).collect()
    }
}
