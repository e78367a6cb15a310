// In-memory relay and stream doubles for application tests
use crate::application::relay_api::{RelayAck, RelayApi, StreamSession, StreamTransport};
use crate::domain::dashboard::{DashboardState, StateHandle};
use crate::domain::status::StatusSnapshot;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

pub enum FakeEvent {
    Frame(String),
    Error(String),
    Close,
}

/// Test-side handle of one accepted stream connection
pub struct FakeConnection {
    events: mpsc::UnboundedSender<FakeEvent>,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<bool>>,
}

impl FakeConnection {
    pub fn frame(&self, text: &str) {
        let _ = self.events.send(FakeEvent::Frame(text.to_string()));
    }

    pub fn error(&self, message: &str) {
        let _ = self.events.send(FakeEvent::Error(message.to_string()));
    }

    pub fn close(&self) {
        let _ = self.events.send(FakeEvent::Close);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Topic of the subscribe directive sent on this connection
    pub fn subscribed_topic(&self) -> Option<String> {
        self.sent().first().and_then(|text| {
            let value: Value = serde_json::from_str(text).ok()?;
            value["topic"].as_str().map(str::to_string)
        })
    }

    pub fn was_closed_by_client(&self) -> bool {
        *self.closed.lock().unwrap()
    }
}

/// Transport whose connections are driven by the test through `FakeConnection`
pub struct FakeTransport {
    accepted: mpsc::UnboundedSender<FakeConnection>,
    refuse: AtomicUsize,
    attempts: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<FakeConnection>) {
        let (accepted, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            accepted,
            refuse: AtomicUsize::new(0),
            attempts: AtomicUsize::new(0),
        });
        (transport, rx)
    }

    /// Fail the next `count` connect attempts
    pub fn refuse_next(&self, count: usize) {
        self.refuse.store(count, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamTransport for FakeTransport {
    async fn connect(&self) -> anyhow::Result<Box<dyn StreamSession>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self
            .refuse
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            anyhow::bail!("connection refused");
        }

        let (events, rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(Mutex::new(false));

        let _ = self.accepted.send(FakeConnection {
            events,
            sent: sent.clone(),
            closed: closed.clone(),
        });

        Ok(Box::new(FakeSession { rx, sent, closed }))
    }
}

struct FakeSession {
    rx: mpsc::UnboundedReceiver<FakeEvent>,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<bool>>,
}

#[async_trait]
impl StreamSession for FakeSession {
    async fn send_text(&mut self, text: String) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<anyhow::Result<String>> {
        match self.rx.recv().await? {
            FakeEvent::Frame(text) => Some(Ok(text)),
            FakeEvent::Error(message) => Some(Err(anyhow::anyhow!(message))),
            FakeEvent::Close => None,
        }
    }

    async fn close(&mut self) {
        *self.closed.lock().unwrap() = true;
    }
}

/// Relay with scripted HTTP replies
#[derive(Default)]
pub struct FakeRelay {
    pub status_replies: Mutex<VecDeque<anyhow::Result<StatusSnapshot>>>,
    pub status_delays: Mutex<VecDeque<Duration>>,
    pub subscribe_fails: Mutex<bool>,
    pub status_calls: AtomicUsize,
    pub subscribed: Mutex<Vec<String>>,
    pub published: Mutex<Vec<(String, Value)>>,
}

impl FakeRelay {
    pub fn push_status(&self, reply: anyhow::Result<StatusSnapshot>) {
        self.status_replies.lock().unwrap().push_back(reply);
    }

    /// Hold the next status reply back for `delay`
    pub fn delay_next_status(&self, delay: Duration) {
        self.status_delays.lock().unwrap().push_back(delay);
    }

    pub fn fail_subscribe(&self, fail: bool) {
        *self.subscribe_fails.lock().unwrap() = fail;
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelayApi for FakeRelay {
    async fn fetch_status(&self) -> anyhow::Result<StatusSnapshot> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .status_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(StatusSnapshot::default()));
        let delay = self.status_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply
    }

    async fn subscribe(&self, topic: &str) -> anyhow::Result<RelayAck> {
        if *self.subscribe_fails.lock().unwrap() {
            anyhow::bail!("relay returned HTTP 500 Internal Server Error");
        }
        self.subscribed.lock().unwrap().push(topic.to_string());
        Ok(RelayAck::new(serde_json::json!({
            "message": format!("Subscribed to topic: {}", topic)
        })))
    }

    async fn publish(&self, topic: &str, message: &Value) -> anyhow::Result<RelayAck> {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), message.clone()));
        Ok(RelayAck::default())
    }
}

pub fn status(status: &str, topic: &str) -> StatusSnapshot {
    StatusSnapshot {
        status: Some(status.to_string()),
        iot_topic: Some(topic.to_string()),
        ..Default::default()
    }
}

/// Wait (in 1ms steps of test time) until the state satisfies `check`
pub async fn wait_until<F>(state: &StateHandle, check: F)
where
    F: Fn(&DashboardState) -> bool,
{
    for _ in 0..500 {
        if check(&*state.read().await) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("dashboard state never reached the expected condition");
}
