//! Records shared by the entity repository and the metadata service

pub mod bundle;
pub mod entity;
pub mod error;
pub mod identifier;
pub mod keys;
pub mod kind;
pub mod metadata;
pub mod relationship;
pub mod resource;

// Re-export commonly used types
pub use bundle::*;
pub use entity::*;
pub use error::{Error, Result};
pub use identifier::*;
pub use kind::EntityKind;
pub use metadata::*;
pub use relationship::*;
pub use resource::Resource;
