//! Relationship editing on a loaded entity

use crate::error::{Error, Result};
use hie_models::{Entity, Relationship};
use uuid::Uuid;

/// Attach `relationship` to `entity`.
///
/// Rejects relationships whose target is the entity itself and relationships
/// already present under the identity rule.
pub fn add_relationship(entity: &mut Entity, relationship: Relationship) -> Result<()> {
    if relationship.is_self_loop(entity.id) {
        return Err(Error::validation(
            "target",
            "an entity cannot be related to itself",
        ));
    }
    if entity
        .relationships
        .iter()
        .any(|existing| existing.same_as(&relationship))
    {
        return Err(Error::validation(
            "target",
            format!("relationship to {} already exists", relationship.target),
        ));
    }

    entity.relationships.push(relationship);
    Ok(())
}

/// Detach the persisted relationship `id` from `entity`
pub fn remove_relationship(entity: &mut Entity, id: Uuid) -> Result<Relationship> {
    let position = entity
        .relationships
        .iter()
        .position(|rel| rel.id == Some(id))
        .ok_or_else(|| Error::not_found("EntityRelationship", id))?;
    Ok(entity.relationships.remove(position))
}
