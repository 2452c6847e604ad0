//! HIE data models
//!
//! Strongly-typed structures for the records exchanged with the two remote
//! data services: the clinical-entity repository (places, materials,
//! organizations and their relationships) and the administrative-metadata
//! service (concepts, concept sets, assigning authorities, reference terms).
//!
//! # Module Organization
//!
//! - `common`: the entity shapes, metadata records, well-known keys and the
//!   `Bundle` container returned by queries
//!
//! # Example
//!
//! ```rust
//! use hie_models::common::{EntityKind, Place, Resource};
//! use serde_json::json;
//!
//! let place: Place = serde_json::from_value(json!({
//!     "$type": "Place",
//!     "id": "6f2b8a64-0f2c-4d0c-9f0e-3b9b2f4e5a11",
//!     "name": "Ward 3 Clinic",
//!     "isMobile": false
//! }))
//! .unwrap();
//!
//! assert_eq!(place.entity.display_name(), "Ward 3 Clinic");
//! assert_eq!(Place::RESOURCE_TYPE, EntityKind::Place.resource_type());
//! ```

pub mod common;

// Re-export commonly used types
pub use common::*;
