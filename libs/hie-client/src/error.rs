//! Error types for hie-client

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Remote service errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{resource_type} request failed with status {status}: {message}")]
    Status {
        resource_type: String,
        status: u16,
        message: String,
    },

    #[error("Could not decode {resource_type} payload: {source}")]
    Decode {
        resource_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Model error: {0}")]
    Model(#[from] hie_models::Error),

    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    #[error("Service error: {0}")]
    Service(String),
}
