//! Generic entity access
//!
//! Callers name the kind of entity they want at runtime (usually from a
//! route tag). The [`DispatchTable`] maps each [`EntityKind`] to handler
//! functions monomorphized for the matching model type, so the accessor
//! itself never matches on kinds.

use crate::cache::MetadataCache;
use crate::error::{Error, Result};
use crate::type_resolver;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use hie_client::{typed, DataServiceClient};
use hie_models::{
    EntityKind, EntityModel, EntityRecord, ManufacturedMaterial, Material, Organization, Place,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub type GetHandler =
    for<'a> fn(&'a dyn DataServiceClient, Uuid) -> BoxFuture<'a, Result<Option<EntityRecord>>>;

pub type UpdateHandler =
    for<'a> fn(&'a dyn DataServiceClient, EntityRecord) -> BoxFuture<'a, Result<EntityRecord>>;

pub type ObsoleteHandler =
    for<'a> fn(&'a dyn DataServiceClient, Uuid) -> BoxFuture<'a, Result<EntityRecord>>;

/// Remote operations for one entity kind
#[derive(Clone, Copy)]
pub struct EntityHandlers {
    pub get: GetHandler,
    pub update: UpdateHandler,
    pub obsolete: ObsoleteHandler,
}

impl EntityHandlers {
    pub fn of<M: EntityModel>() -> Self {
        Self {
            get: get_model::<M>,
            update: update_model::<M>,
            obsolete: obsolete_model::<M>,
        }
    }
}

fn get_model<M: EntityModel>(
    client: &dyn DataServiceClient,
    id: Uuid,
) -> BoxFuture<'_, Result<Option<EntityRecord>>> {
    Box::pin(async move {
        let model = typed::get_as::<M>(client, id, None).await?;
        Ok(model.map(M::into_record))
    })
}

fn update_model<M: EntityModel>(
    client: &dyn DataServiceClient,
    record: EntityRecord,
) -> BoxFuture<'_, Result<EntityRecord>> {
    Box::pin(async move {
        let id = record.id();
        let kind = record.kind();
        let model = M::from_record(record).ok_or_else(|| {
            Error::validation(
                "type",
                format!("{kind} record submitted to the {} handler", M::KIND),
            )
        })?;
        let updated = typed::update_as(client, id, &model).await?;
        Ok(updated.into_record())
    })
}

fn obsolete_model<M: EntityModel>(
    client: &dyn DataServiceClient,
    id: Uuid,
) -> BoxFuture<'_, Result<EntityRecord>> {
    Box::pin(async move {
        let obsoleted = typed::obsolete_as::<M>(client, id).await?;
        Ok(obsoleted.into_record())
    })
}

/// Handlers registered per entity kind
#[derive(Clone, Default)]
pub struct DispatchTable {
    handlers: HashMap<EntityKind, EntityHandlers>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table covering every supported kind
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register::<Place>();
        table.register::<Material>();
        table.register::<ManufacturedMaterial>();
        table.register::<Organization>();
        table
    }

    pub fn register<M: EntityModel>(&mut self) {
        self.handlers.insert(M::KIND, EntityHandlers::of::<M>());
    }

    pub fn handlers(&self, kind: EntityKind) -> Result<&EntityHandlers> {
        self.handlers
            .get(&kind)
            .ok_or_else(|| Error::UnsupportedType(kind.to_string()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.handlers.keys().copied()
    }
}

/// Get, update and obsolete entities of any registered kind
pub struct EntityAccessor {
    client: Arc<dyn DataServiceClient>,
    cache: Arc<MetadataCache>,
    table: Arc<DispatchTable>,
}

impl EntityAccessor {
    pub fn new(client: Arc<dyn DataServiceClient>, cache: Arc<MetadataCache>) -> Self {
        Self::with_table(client, cache, Arc::new(DispatchTable::standard()))
    }

    pub fn with_table(
        client: Arc<dyn DataServiceClient>,
        cache: Arc<MetadataCache>,
        table: Arc<DispatchTable>,
    ) -> Self {
        Self {
            client,
            cache,
            table,
        }
    }

    /// Current version of entity `id`.
    ///
    /// Fails with [`Error::NotFound`] when the repository has no such record
    /// or the record has been obsoleted.
    pub async fn get(&self, id: Uuid, kind: EntityKind) -> Result<EntityRecord> {
        let handlers = self.table.handlers(kind)?;
        tracing::debug!(%id, %kind, "getting entity");

        match (handlers.get)(self.client.as_ref(), id).await? {
            Some(record) if !record.entity().is_obsolete() => Ok(record),
            _ => Err(Error::not_found(kind.as_str(), id)),
        }
    }

    pub async fn get_by_tag(&self, id: Uuid, tag: &str) -> Result<EntityRecord> {
        self.get(id, type_resolver::resolve(tag)?).await
    }

    /// Like [`get`](Self::get), but served from the shared cache when possible.
    ///
    /// A missing or obsolete entity yields `Ok(None)`.
    pub async fn get_cached(&self, id: Uuid, kind: EntityKind) -> Result<Option<Arc<EntityRecord>>> {
        let key = id.to_string();
        self.cache
            .get_or_fetch(&key, || async move {
                match self.get(id, kind).await {
                    Ok(record) => Ok(Some(record)),
                    Err(err) if err.is_not_found() => Ok(None),
                    Err(err) => Err(err),
                }
            })
            .await
    }

    /// Submit `record` as the new version of its entity.
    ///
    /// Self-referencing relationships and the version id are stripped before
    /// submission. The service's copy replaces any cached entry for the id
    /// only once the update has succeeded.
    pub async fn update(&self, mut record: EntityRecord) -> Result<EntityRecord> {
        let kind = record.kind();
        let handlers = self.table.handlers(kind)?;

        prepare_for_update(&mut record, Utc::now());
        tracing::debug!(id = %record.id(), %kind, "submitting entity update");

        let updated = (handlers.update)(self.client.as_ref(), record).await?;
        self.cache
            .insert(updated.id().to_string(), Arc::new(updated.clone()));
        Ok(updated)
    }

    /// Update after checking the record against the kind named by `tag`
    pub async fn update_by_tag(&self, tag: &str, record: EntityRecord) -> Result<EntityRecord> {
        let kind = type_resolver::resolve(tag)?;
        if kind != record.kind() {
            return Err(Error::validation(
                "type",
                format!("expected a {kind} record, got {}", record.kind()),
            ));
        }
        self.update(record).await
    }

    /// Soft-delete entity `id` and drop it from the cache
    pub async fn obsolete(&self, id: Uuid, kind: EntityKind) -> Result<EntityRecord> {
        let handlers = self.table.handlers(kind)?;
        tracing::debug!(%id, %kind, "obsoleting entity");

        let obsoleted = (handlers.obsolete)(self.client.as_ref(), id).await?;
        self.cache.remove(&id.to_string());
        Ok(obsoleted)
    }

    pub async fn obsolete_by_tag(&self, id: Uuid, tag: &str) -> Result<EntityRecord> {
        self.obsolete(id, type_resolver::resolve(tag)?).await
    }
}

/// Ready `record` for submission as a new version.
///
/// In order: stamp `now` as creation and modification time, drop every
/// relationship targeting the entity itself, clear the version id.
pub fn prepare_for_update(record: &mut EntityRecord, now: DateTime<Utc>) {
    let entity = record.entity_mut();
    entity.creation_time = Some(now);
    entity.modified_on = Some(now);

    let owner = entity.id;
    let before = entity.relationships.len();
    entity.relationships.retain(|rel| !rel.is_self_loop(owner));
    let stripped = before - entity.relationships.len();
    if stripped > 0 {
        tracing::debug!(id = %owner, stripped, "removed self-referencing relationships");
    }

    entity.version_id = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use hie_models::keys::relationship_types;
    use hie_models::{Entity, Relationship};

    fn place(id: u128) -> Place {
        Place {
            entity: Entity::new(Uuid::from_u128(id)),
            ..Default::default()
        }
    }

    #[test]
    fn test_prepare_strips_self_loops_and_version() {
        let p1 = Uuid::from_u128(1);
        let p2 = Uuid::from_u128(2);
        let mut model = place(1);
        model.entity.version_id = Some(Uuid::from_u128(99));
        model.entity.relationships = vec![
            Relationship::new(p1, p1, relationship_types::PARENT),
            Relationship::new(p1, p2, relationship_types::PARENT),
        ];
        let mut record = model.into_record();

        let now = Utc::now();
        prepare_for_update(&mut record, now);

        let entity = record.entity();
        assert_eq!(entity.relationships.len(), 1);
        assert_eq!(entity.relationships[0].target, p2);
        assert_eq!(entity.version_id, None);
        assert_eq!(entity.creation_time, Some(now));
        assert_eq!(entity.modified_on, Some(now));
    }

    #[test]
    fn test_standard_table_covers_every_kind() {
        let table = DispatchTable::standard();
        for kind in EntityKind::ALL {
            assert!(table.handlers(kind).is_ok(), "missing handlers for {kind}");
        }
        assert_eq!(table.kinds().count(), EntityKind::ALL.len());
    }

    #[test]
    fn test_unregistered_kind_is_unsupported() {
        let mut table = DispatchTable::new();
        table.register::<Place>();

        assert!(table.handlers(EntityKind::Place).is_ok());
        match table.handlers(EntityKind::Organization) {
            Err(Error::UnsupportedType(tag)) => assert_eq!(tag, "Organization"),
            other => panic!("expected UnsupportedType, got {:?}", other.err()),
        }
    }
}
