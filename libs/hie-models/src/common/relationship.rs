//! Directed, typed edges between entities

use super::entity::Entity;
use super::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A relationship from `source` to `target` of a given type.
///
/// `id` is absent while the relationship is newly constructed and becomes
/// present once the repository has persisted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    pub source: Uuid,

    pub target: Uuid,

    pub relationship_type: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_version_sequence: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obsolete_version_sequence: Option<i64>,

    /// Loaded target record, populated by expansion or bundle reconstitution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_model: Option<Box<Entity>>,
}

impl Relationship {
    pub fn new(source: Uuid, target: Uuid, relationship_type: Uuid) -> Self {
        Self {
            id: None,
            source,
            target,
            relationship_type,
            quantity: None,
            effective_version_sequence: None,
            obsolete_version_sequence: None,
            target_model: None,
        }
    }

    pub fn with_quantity(mut self, quantity: i32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// (source, target, type) triple used when identity is unavailable
    pub fn triple(&self) -> (Uuid, Uuid, Uuid) {
        (self.source, self.target, self.relationship_type)
    }

    /// Identity rule: equal ids when both are persisted, otherwise equal triples.
    pub fn same_as(&self, other: &Relationship) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.triple() == other.triple(),
        }
    }

    /// True when the relationship points back at its owning entity
    pub fn is_self_loop(&self, owner: Uuid) -> bool {
        self.target == owner
    }

    pub fn is_target_loaded(&self) -> bool {
        self.target_model.is_some()
    }
}

impl Resource for Relationship {
    const RESOURCE_TYPE: &'static str = "EntityRelationship";

    fn id(&self) -> Option<Uuid> {
        self.id
    }

    // Relationships are retired by version sequence rather than timestamp
    fn obsoletion_time(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn is_obsolete(&self) -> bool {
        self.obsolete_version_sequence.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::keys::relationship_types;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_same_identity_is_same_relationship() {
        let mut a = Relationship::new(id(1), id(2), relationship_types::PARENT);
        let mut b = Relationship::new(id(1), id(3), relationship_types::CHILD);
        a.id = Some(id(99));
        b.id = Some(id(99));

        assert!(a.same_as(&b));
    }

    #[test]
    fn test_distinct_identities_are_distinct_even_with_equal_triples() {
        let mut a = Relationship::new(id(1), id(2), relationship_types::PARENT);
        let mut b = a.clone();
        a.id = Some(id(10));
        b.id = Some(id(11));

        assert!(!a.same_as(&b));
    }

    #[test]
    fn test_missing_identity_falls_back_to_triple() {
        let persisted = Relationship {
            id: Some(id(10)),
            ..Relationship::new(id(1), id(2), relationship_types::PARENT)
        };
        let fresh = Relationship::new(id(1), id(2), relationship_types::PARENT);
        let other_type = Relationship::new(id(1), id(2), relationship_types::OWNED_ENTITY);

        assert!(persisted.same_as(&fresh));
        assert!(fresh.same_as(&persisted));
        assert!(!fresh.same_as(&other_type));
    }

    #[test]
    fn test_self_loop_detection() {
        let rel = Relationship::new(id(1), id(1), relationship_types::PARENT);
        assert!(rel.is_self_loop(id(1)));
        assert!(!rel.is_self_loop(id(2)));
    }

    #[test]
    fn test_obsolete_by_version_sequence() {
        let mut rel = Relationship::new(id(1), id(2), relationship_types::PARENT);
        assert!(!rel.is_obsolete());
        rel.obsolete_version_sequence = Some(12);
        assert!(rel.is_obsolete());
    }
}
