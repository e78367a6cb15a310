use crate::application::connection_manager::DEFAULT_RECONNECT_DELAY;
use crate::application::dashboard_controller::DashboardSettings;
use crate::application::status_poller::DEFAULT_POLL_INTERVAL;
use crate::domain::record_buffer::DEFAULT_MAX_RECORDS;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub relay: RelaySettings,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RelaySettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Overrides the stream URL derived from `base_url`
    #[serde(default)]
    pub ws_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_status_poll_interval_ms")]
    pub status_poll_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

fn default_base_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_topic() -> String {
    "test/topic".to_string()
}

fn default_max_records() -> usize {
    DEFAULT_MAX_RECORDS
}

fn default_reconnect_delay_ms() -> u64 {
    DEFAULT_RECONNECT_DELAY.as_millis() as u64
}

fn default_status_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: None,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            max_records: default_max_records(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            status_poll_interval_ms: default_status_poll_interval_ms(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl RelaySettings {
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    /// Stream endpoint: explicit `ws_url`, else `base_url` with a ws scheme and `/ws`
    pub fn stream_url(&self) -> String {
        if let Some(url) = &self.ws_url {
            return url.clone();
        }

        let base = self.base_url();
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        format!("{}/ws", base)
    }
}

impl DashboardConfig {
    pub fn to_settings(&self) -> DashboardSettings {
        DashboardSettings {
            initial_topic: self.topic.clone(),
            max_records: self.max_records,
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
            status_poll_interval: Duration::from_millis(self.status_poll_interval_ms),
        }
    }
}

/// Defaults, overlaid by `config/dashboard.*` if present, then `DASHBOARD__*` env vars
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
