// Domain layer - Plain data owned by the dashboard
pub mod dashboard;
pub mod record_buffer;
pub mod status;
pub mod telemetry;
