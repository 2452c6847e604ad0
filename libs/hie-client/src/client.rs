//! Service interface consumed by the admin core

use crate::query::Query;
use crate::Result;
use async_trait::async_trait;
use hie_models::Bundle;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Operations offered by a remote data service.
///
/// Each call is parameterized by the resource type route segment (`Place`,
/// `Concept`, `EntityRelationship`, ...). Mutating operations return the
/// service's authoritative copy of the record.
#[async_trait]
pub trait DataServiceClient: Send + Sync {
    /// Query records of `resource_type`. The returned bundle is not yet
    /// reconstituted.
    async fn query(&self, resource_type: &str, query: &Query) -> Result<Bundle>;

    /// Fetch one record, optionally a specific historical version.
    ///
    /// Returns `Ok(None)` when the service has no such record.
    async fn get(
        &self,
        resource_type: &str,
        id: Uuid,
        version_id: Option<Uuid>,
    ) -> Result<Option<JsonValue>>;

    async fn create(&self, resource_type: &str, resource: JsonValue) -> Result<JsonValue>;

    async fn update(&self, resource_type: &str, id: Uuid, resource: JsonValue)
        -> Result<JsonValue>;

    /// Soft-delete a record; the returned copy carries its obsoletion marker
    async fn obsolete(&self, resource_type: &str, id: Uuid) -> Result<JsonValue>;
}
