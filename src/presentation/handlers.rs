// HTTP request handlers for the local dashboard
use crate::application::error::DashboardError;
use crate::application::subscription_service::SUBSCRIBE_ERROR_MESSAGE;
use crate::domain::dashboard::{ConnectionState, DashboardSnapshot};
use crate::domain::status::StatusView;
use crate::domain::telemetry::ChartData;
use crate::infrastructure::http_response::{error_response, json_response, text_response};
use crate::presentation::app_state::AppState;
use crate::presentation::views::render_dashboard;
use axum::{
    body::Body,
    extract::State,
    http::{Response, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct TopicRequest {
    pub topic: String,
}

#[derive(Deserialize)]
pub struct PublishRequest {
    pub topic: Option<String>,
    pub message: Value,
}

#[derive(Serialize)]
pub struct DashboardView {
    pub topic: String,
    pub connection: ConnectionState,
    pub status: StatusView,
    pub subscribe_error: Option<String>,
    pub chart: ChartData,
    pub records: Vec<Value>,
}

impl From<DashboardSnapshot> for DashboardView {
    fn from(snapshot: DashboardSnapshot) -> Self {
        Self {
            chart: snapshot.chart(),
            records: snapshot.raw_records(),
            topic: snapshot.topic,
            connection: snapshot.connection,
            status: snapshot.status,
            subscribe_error: snapshot.subscribe_error,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/", get(dashboard_text))
        .route("/api/dashboard", get(dashboard_json))
        .route("/api/subscribe", post(subscribe))
        .route("/api/topic", put(set_topic))
        .route("/api/publish", post(publish))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Whole dashboard rendered as text
pub async fn dashboard_text(State(state): State<Arc<AppState>>) -> Response<Body> {
    let snapshot = state.dashboard.snapshot().await;
    text_response(render_dashboard(&snapshot))
}

pub async fn dashboard_json(State(state): State<Arc<AppState>>) -> Response<Body> {
    let view = DashboardView::from(state.dashboard.snapshot().await);
    json_response(StatusCode::OK, &view)
}

/// Switch the relay subscription
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TopicRequest>,
) -> Response<Body> {
    match state.dashboard.submit_topic(&request.topic).await {
        Ok(ack) => json_response(StatusCode::OK, &ack),
        Err(DashboardError::EmptyTopic) => {
            error_response(StatusCode::BAD_REQUEST, DashboardError::EmptyTopic.to_string())
        }
        Err(e) => {
            tracing::warn!("Subscribe request failed: {}", e);
            error_response(StatusCode::BAD_GATEWAY, SUBSCRIBE_ERROR_MESSAGE)
        }
    }
}

/// Change the streamed topic without contacting the relay
pub async fn set_topic(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TopicRequest>,
) -> Response<Body> {
    match state.dashboard.set_topic(&request.topic).await {
        Ok(()) => json_response(StatusCode::OK, &json!({ "topic": request.topic })),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

pub async fn publish(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PublishRequest>,
) -> Response<Body> {
    match state
        .dashboard
        .publish(request.topic.as_deref(), &request.message)
        .await
    {
        Ok(ack) => json_response(StatusCode::OK, &ack),
        Err(DashboardError::EmptyTopic) => {
            error_response(StatusCode::BAD_REQUEST, DashboardError::EmptyTopic.to_string())
        }
        Err(e) => {
            tracing::warn!("Publish request failed: {:#}", e);
            error_response(StatusCode::BAD_GATEWAY, "Failed to publish message")
        }
    }
}
