// Errors surfaced by dashboard operations
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("topic must not be empty")]
    EmptyTopic,

    #[error("failed to subscribe to topic '{topic}': {source}")]
    Subscribe {
        topic: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Relay(#[from] anyhow::Error),
}
