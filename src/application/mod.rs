// Application layer - Dashboard use cases and the seams they depend on
pub mod connection_manager;
pub mod dashboard_controller;
pub mod error;
pub mod relay_api;
pub mod status_poller;
pub mod subscription_service;

#[cfg(test)]
pub mod test_support;
