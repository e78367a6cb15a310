// Relay HTTP client implementation
use crate::application::relay_api::{RelayAck, RelayApi};
use crate::domain::status::StatusSnapshot;
use crate::infrastructure::config::RelaySettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    client: reqwest::Client,
    status_url: String,
    subscribe_url: String,
    publish_url: String,
}

#[derive(Debug, Serialize)]
struct SubscribeRequest<'a> {
    topic: &'a str,
}

#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    topic: &'a str,
    message: &'a Value,
}

impl HttpRelayClient {
    pub fn new(settings: &RelaySettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            status_url: settings.endpoint("status"),
            subscribe_url: settings.endpoint("subscribe"),
            publish_url: settings.endpoint("publish"),
        }
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} request failed with HTTP {}: {}", what, status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }
}

#[async_trait]
impl RelayApi for HttpRelayClient {
    async fn fetch_status(&self) -> Result<StatusSnapshot> {
        let response = self
            .client
            .get(&self.status_url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send status request to relay")?;

        Self::read_json(response, "status").await
    }

    async fn subscribe(&self, topic: &str) -> Result<RelayAck> {
        let response = self
            .client
            .post(&self.subscribe_url)
            .json(&SubscribeRequest { topic })
            .send()
            .await
            .context("Failed to send subscribe request to relay")?;

        Self::read_json(response, "subscribe").await
    }

    async fn publish(&self, topic: &str, message: &Value) -> Result<RelayAck> {
        let response = self
            .client
            .post(&self.publish_url)
            .json(&PublishRequest { topic, message })
            .send()
            .await
            .context("Failed to send publish request to relay")?;

        Self::read_json(response, "publish").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    async fn serve(router: Router) -> RelaySettings {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        RelaySettings {
            base_url: format!("http://{}", addr),
            ws_url: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_status_parses_body() {
        let router = Router::new().route(
            "/status",
            get(|| async {
                Json(json!({"status": "running", "iot_topic": "test/topic", "connected_clients": 2}))
            }),
        );
        let client = HttpRelayClient::new(&serve(router).await);

        let status = client.fetch_status().await.unwrap();
        assert_eq!(status.status.as_deref(), Some("running"));
        assert_eq!(status.iot_topic.as_deref(), Some("test/topic"));
        assert_eq!(status.connected_clients, Some(2));
    }

    #[tokio::test]
    async fn test_fetch_status_http_500_is_an_error() {
        let router = Router::new().route(
            "/status",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = HttpRelayClient::new(&serve(router).await);

        let err = client.fetch_status().await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_fetch_status_rejects_non_json_body() {
        let router = Router::new().route("/status", get(|| async { "ok" }));
        let client = HttpRelayClient::new(&serve(router).await);

        assert!(client.fetch_status().await.is_err());
    }

    #[tokio::test]
    async fn test_subscribe_posts_topic() {
        let router = Router::new().route(
            "/subscribe",
            post(|Json(body): Json<Value>| async move {
                let topic = body["topic"].as_str().unwrap_or_default().to_string();
                Json(json!({ "message": format!("Subscribed to topic: {}", topic) }))
            }),
        );
        let client = HttpRelayClient::new(&serve(router).await);

        let ack = client.subscribe("sensors/a").await.unwrap();
        assert_eq!(ack.message().as_deref(), Some("Subscribed to topic: sensors/a"));
    }

    #[tokio::test]
    async fn test_subscribe_failure_status() {
        let router = Router::new().route(
            "/subscribe",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "bad topic") }),
        );
        let client = HttpRelayClient::new(&serve(router).await);

        let err = client.subscribe("x").await.unwrap_err();
        assert!(err.to_string().contains("422"));
    }

    #[tokio::test]
    async fn test_subscribe_accepts_any_json_reply() {
        let router = Router::new()
            .route(
                "/subscribe",
                post(|| async { Json(json!({ "message": { "text": "Subscribed" } })) }),
            )
            .route("/publish", post(|| async { Json(json!([1, 2, 3])) }));
        let client = HttpRelayClient::new(&serve(router).await);

        let ack = client.subscribe("sensors/a").await.unwrap();
        assert_eq!(ack.message().as_deref(), Some(r#"{"text":"Subscribed"}"#));

        let ack = client.publish("sensors/a", &json!({})).await.unwrap();
        assert_eq!(ack.body, json!([1, 2, 3]));
        assert_eq!(ack.message(), None);
    }

    #[tokio::test]
    async fn test_subscribe_rejects_non_json_reply() {
        let router = Router::new().route("/subscribe", post(|| async { "Subscribed" }));
        let client = HttpRelayClient::new(&serve(router).await);

        assert!(client.subscribe("sensors/a").await.is_err());
    }

    #[tokio::test]
    async fn test_publish_sends_topic_and_message() {
        let router = Router::new().route(
            "/publish",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["topic"], "sensors/a");
                assert_eq!(body["message"]["data"]["temperature"], 20);
                Json(json!({ "message": "Message published successfully" }))
            }),
        );
        let client = HttpRelayClient::new(&serve(router).await);

        let ack = client
            .publish("sensors/a", &json!({"device_id": "d1", "data": {"temperature": 20}}))
            .await
            .unwrap();
        assert_eq!(ack.message().as_deref(), Some("Message published successfully"));
    }
}
