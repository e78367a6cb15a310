// Presentation layer - Text views and the local HTTP surface
pub mod app_state;
pub mod handlers;
pub mod views;
