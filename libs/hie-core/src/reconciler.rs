//! Relationship reconciliation for display
//!
//! An entity's relationship list as loaded may be stale. Reconciliation runs
//! a set of relationship queries against the repository, keeps only the
//! relationships that are both currently stored and present on the loaded
//! entity, and turns each survivor into a [`RelationshipView`] with its
//! counterpart resolved and its type named.
//!
//! Views are presentation values. Their display type may differ from the
//! stored type (a Parent relationship seen from its target reads as Child)
//! and there is no conversion from a view back to a [`Relationship`].

use crate::accessor::EntityAccessor;
use crate::error::Result;
use crate::lookup::MetadataLookup;
use hie_client::{typed, DataServiceClient, Query};
use hie_models::keys::{entity_classes, relationship_types};
use hie_models::{EntityKind, EntityRecord, Relationship};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Which end of the relationship the reconciled entity sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Source,
    Target,
}

impl Direction {
    fn property(self) -> &'static str {
        match self {
            Direction::Source => "source",
            Direction::Target => "target",
        }
    }
}

/// One relationship query, relative to the entity being reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipQuery {
    pub direction: Direction,
    /// `None` matches every relationship type
    pub relationship_type: Option<Uuid>,
    /// Kind of the entity at the other end
    pub related_kind: EntityKind,
}

impl RelationshipQuery {
    /// Relationships the entity holds as source
    pub fn outgoing(relationship_type: Option<Uuid>, related_kind: EntityKind) -> Self {
        Self {
            direction: Direction::Source,
            relationship_type,
            related_kind,
        }
    }

    /// Relationships pointing at the entity
    pub fn incoming(relationship_type: Option<Uuid>, related_kind: EntityKind) -> Self {
        Self {
            direction: Direction::Target,
            relationship_type,
            related_kind,
        }
    }

    pub fn to_query(&self, entity_id: Uuid) -> Query {
        let mut query = Query::new().filter(self.direction.property(), entity_id);
        if let Some(relationship_type) = self.relationship_type {
            query = query.filter("relationshipType", relationship_type);
        }
        query.filter("obsoleteVersionSequence", "null")
    }
}

/// Standard query set for `record`, by kind and role
pub fn default_queries(record: &EntityRecord) -> Vec<RelationshipQuery> {
    use relationship_types::*;
    use EntityKind::*;

    match record.kind() {
        Place if is_service_delivery_location(record) => vec![
            RelationshipQuery::outgoing(Some(PARENT), Place),
            RelationshipQuery::outgoing(Some(OWNED_ENTITY), Material),
            RelationshipQuery::incoming(Some(DEDICATED_SERVICE_DELIVERY_LOCATION), Organization),
        ],
        Place => vec![
            RelationshipQuery::outgoing(None, Place),
            RelationshipQuery::incoming(Some(PARENT), Place),
        ],
        Material => vec![RelationshipQuery::outgoing(
            Some(MANUFACTURED_PRODUCT),
            ManufacturedMaterial,
        )],
        ManufacturedMaterial => vec![RelationshipQuery::incoming(
            Some(MANUFACTURED_PRODUCT),
            Material,
        )],
        Organization => vec![
            RelationshipQuery::outgoing(Some(OWNED_ENTITY), Material),
            RelationshipQuery::outgoing(Some(PARENT), Organization),
            RelationshipQuery::incoming(Some(PARENT), Organization),
        ],
    }
}

fn is_service_delivery_location(record: &EntityRecord) -> bool {
    record.entity().class_concept == Some(entity_classes::SERVICE_DELIVERY_LOCATION)
}

/// Relationships present in both `queried` and `loaded`, in `queried` order.
///
/// Duplicates under the identity rule are collapsed to their first
/// occurrence. A survivor without a loaded target takes the loaded copy's.
pub fn merge_relationships(queried: &[Relationship], loaded: &[Relationship]) -> Vec<Relationship> {
    let mut merged: Vec<Relationship> = Vec::new();

    for candidate in queried {
        if merged.iter().any(|kept| kept.same_as(candidate)) {
            continue;
        }
        let Some(stored) = loaded.iter().find(|rel| rel.same_as(candidate)) else {
            continue;
        };

        let mut kept = candidate.clone();
        if kept.target_model.is_none() {
            kept.target_model = stored.target_model.clone();
        }
        merged.push(kept);
    }

    merged
}

/// A relationship as presented to a viewer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipView {
    /// The relationship as stored
    pub relationship: Relationship,
    /// Type shown to the viewer
    pub display_type: Uuid,
    /// The viewer is the relationship's target
    pub inverse: bool,
    /// Mnemonic of the display type concept
    pub type_name: Option<String>,
    /// Entity at the other end, as seen from the viewer
    pub counterpart_id: Uuid,
    pub counterpart_name: Option<String>,
    #[serde(skip)]
    pub counterpart: Option<Arc<EntityRecord>>,
}

impl RelationshipView {
    /// View of `relationship` from entity `viewer`
    pub fn for_display(relationship: Relationship, viewer: Uuid) -> Self {
        let inverse = relationship.target == viewer;
        let display_type = if inverse && relationship.relationship_type == relationship_types::PARENT
        {
            relationship_types::CHILD
        } else {
            relationship.relationship_type
        };
        let counterpart_id = if inverse {
            relationship.source
        } else {
            relationship.target
        };
        let counterpart_name = match &relationship.target_model {
            Some(target) if !inverse => Some(target.display_name()),
            _ => None,
        };

        Self {
            relationship,
            display_type,
            inverse,
            type_name: None,
            counterpart_id,
            counterpart_name,
            counterpart: None,
        }
    }

    /// Case-insensitive counterpart name, falling back to its id
    pub fn counterpart_sort_key(&self) -> String {
        self.counterpart_name
            .clone()
            .unwrap_or_else(|| self.counterpart_id.to_string())
            .to_lowercase()
    }
}

pub struct RelationshipReconciler {
    client: Arc<dyn DataServiceClient>,
    accessor: Arc<EntityAccessor>,
    lookup: Arc<MetadataLookup>,
}

impl RelationshipReconciler {
    pub fn new(
        client: Arc<dyn DataServiceClient>,
        accessor: Arc<EntityAccessor>,
        lookup: Arc<MetadataLookup>,
    ) -> Self {
        Self {
            client,
            accessor,
            lookup,
        }
    }

    /// Reconcile `record`'s loaded relationships against `queries`.
    ///
    /// Queries run one after another and each is read to its last page; the
    /// first failing query fails the whole call. Views are ordered by
    /// `sort_key`.
    pub async fn reconcile<K, F>(
        &self,
        record: &EntityRecord,
        queries: &[RelationshipQuery],
        sort_key: F,
    ) -> Result<Vec<RelationshipView>>
    where
        K: Ord,
        F: Fn(&RelationshipView) -> K,
    {
        let entity = record.entity();
        let mut queried: Vec<(Relationship, EntityKind)> = Vec::new();

        for query in queries {
            let mut bundle =
                typed::query_all::<Relationship>(self.client.as_ref(), &query.to_query(entity.id))
                    .await?;
            bundle.reconstitute();
            let found = bundle.resources::<Relationship>()?;
            tracing::trace!(
                id = %entity.id,
                direction = ?query.direction,
                count = found.len(),
                "relationship query"
            );
            queried.extend(found.into_iter().map(|rel| (rel, query.related_kind)));
        }

        let candidates: Vec<Relationship> = queried.iter().map(|(rel, _)| rel.clone()).collect();
        let merged = merge_relationships(&candidates, &entity.relationships);
        tracing::debug!(
            id = %entity.id,
            queried = candidates.len(),
            loaded = entity.relationships.len(),
            kept = merged.len(),
            "reconciled relationships"
        );

        let mut views = Vec::with_capacity(merged.len());
        for relationship in merged {
            let related_kind = queried
                .iter()
                .find(|(rel, _)| rel.same_as(&relationship))
                .map(|(_, kind)| *kind);
            let mut view = RelationshipView::for_display(relationship, entity.id);
            self.resolve_counterpart(&mut view, record, related_kind)
                .await?;
            view.type_name = self
                .lookup
                .concept(view.display_type)
                .await?
                .map(|concept| concept.mnemonic.clone());
            views.push(view);
        }

        views.sort_by_key(|view| sort_key(view));
        Ok(views)
    }

    /// Reconcile with [`default_queries`], ordered by counterpart name
    pub async fn reconcile_default(&self, record: &EntityRecord) -> Result<Vec<RelationshipView>> {
        let queries = default_queries(record);
        self.reconcile(record, &queries, RelationshipView::counterpart_sort_key)
            .await
    }

    async fn resolve_counterpart(
        &self,
        view: &mut RelationshipView,
        record: &EntityRecord,
        related_kind: Option<EntityKind>,
    ) -> Result<()> {
        if view.counterpart_name.is_some() {
            return Ok(());
        }
        if view.counterpart_id == record.id() {
            view.counterpart_name = Some(record.entity().display_name());
            return Ok(());
        }

        let kind = related_kind.unwrap_or_else(|| record.kind());
        if let Some(counterpart) = self.accessor.get_cached(view.counterpart_id, kind).await? {
            view.counterpart_name = Some(counterpart.entity().display_name());
            view.counterpart = Some(counterpart);
        } else {
            tracing::debug!(id = %view.counterpart_id, %kind, "relationship counterpart not found");
        }
        Ok(())
    }
}
