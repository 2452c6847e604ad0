//! Wiring of the core components around two service clients

use crate::accessor::EntityAccessor;
use crate::cache::{CacheConfig, MetadataCache};
use crate::lookup::MetadataLookup;
use crate::reconciler::RelationshipReconciler;
use hie_client::DataServiceClient;
use std::sync::Arc;

/// Everything an admin request needs, built once at startup.
///
/// `repository` serves entities and relationships, `metadata` serves
/// concepts, concept sets, assigning authorities and reference terms. Both
/// share one [`MetadataCache`].
pub struct AdminContext {
    pub cache: Arc<MetadataCache>,
    pub lookup: Arc<MetadataLookup>,
    pub accessor: Arc<EntityAccessor>,
    pub reconciler: RelationshipReconciler,
}

impl AdminContext {
    pub fn new(
        repository: Arc<dyn DataServiceClient>,
        metadata: Arc<dyn DataServiceClient>,
        cache_config: &CacheConfig,
    ) -> Self {
        let cache = Arc::new(MetadataCache::new(cache_config));
        let lookup = Arc::new(MetadataLookup::new(metadata, cache.clone()));
        let accessor = Arc::new(EntityAccessor::new(repository.clone(), cache.clone()));
        let reconciler = RelationshipReconciler::new(repository, accessor.clone(), lookup.clone());

        Self {
            cache,
            lookup,
            accessor,
            reconciler,
        }
    }
}
