//! Closed set of entity kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime tag selecting which concrete entity shape and which remote
/// operations apply. Carries no data of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Place,
    Material,
    ManufacturedMaterial,
    Organization,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Place,
        EntityKind::Material,
        EntityKind::ManufacturedMaterial,
        EntityKind::Organization,
    ];

    /// Canonical tag, as used in routes and `$type` discriminators
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Place => "Place",
            EntityKind::Material => "Material",
            EntityKind::ManufacturedMaterial => "ManufacturedMaterial",
            EntityKind::Organization => "Organization",
        }
    }

    /// Route segment of the entity repository for this kind
    pub fn resource_type(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
