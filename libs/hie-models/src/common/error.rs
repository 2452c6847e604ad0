//! Error types for HIE models

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Bundle must be reconstituted before its items are traversed")]
    NotReconstituted,

    #[error("Invalid field value: {0}")]
    InvalidFieldValue(String),
}

pub type Result<T> = std::result::Result<T, Error>;
