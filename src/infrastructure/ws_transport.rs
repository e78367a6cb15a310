// WebSocket stream transport
use crate::application::relay_api::{StreamSession, StreamTransport};
use anyhow::Context;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone)]
pub struct WsTransport {
    url: String,
}

impl WsTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl StreamTransport for WsTransport {
    async fn connect(&self) -> anyhow::Result<Box<dyn StreamSession>> {
        tracing::debug!("Connecting to {}", self.url);
        let (stream, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .with_context(|| format!("Failed to connect to {}", self.url))?;

        let (write, read) = stream.split();
        Ok(Box::new(WsSession { write, read }))
    }
}

struct WsSession {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
}

#[async_trait]
impl StreamSession for WsSession {
    async fn send_text(&mut self, text: String) -> anyhow::Result<()> {
        self.write
            .send(Message::Text(text))
            .await
            .context("Failed to send frame")
    }

    async fn next_frame(&mut self) -> Option<anyhow::Result<String>> {
        loop {
            let message = match self.read.next().await? {
                Ok(message) => message,
                Err(e) => return Some(Err(e.into())),
            };

            match message {
                Message::Text(text) => return Some(Ok(text)),
                Message::Binary(bytes) => {
                    return Some(Ok(String::from_utf8_lossy(&bytes).into_owned()));
                }
                Message::Close(frame) => {
                    tracing::debug!("Relay closed the stream: {:?}", frame);
                    return None;
                }
                // ping/pong are answered by tungstenite itself
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.write.close().await {
            tracing::debug!("Error closing stream: {}", e);
        }
    }
}
