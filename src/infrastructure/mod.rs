// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_relay_client;
pub mod http_response;
pub mod ws_transport;
