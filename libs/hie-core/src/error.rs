//! Error types for the admin core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported entity type: '{0}'")]
    UnsupportedType(String),

    #[error("{resource_type} not found: {id}")]
    NotFound { resource_type: String, id: String },

    #[error("Invalid format for {field}: '{value}' does not satisfy {rule}")]
    FormatInvalid {
        field: String,
        value: String,
        rule: String,
    },

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Remote service error: {0}")]
    RemoteService(#[from] hie_client::Error),
}

impl Error {
    pub fn not_found(resource_type: impl Into<String>, id: impl ToString) -> Self {
        Error::NotFound {
            resource_type: resource_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Input field a validation error refers to
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::FormatInvalid { field, .. } | Error::Validation { field, .. } => Some(field),
            Error::UnsupportedType(_) => Some("type"),
            _ => None,
        }
    }

    /// Detected locally, before any remote mutation was attempted
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedType(_) | Error::FormatInvalid { .. } | Error::Validation { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

// Model errors only arise while interpreting remote payloads
impl From<hie_models::Error> for Error {
    fn from(err: hie_models::Error) -> Self {
        Error::RemoteService(hie_client::Error::Model(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
