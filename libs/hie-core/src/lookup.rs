//! Cached lookups of reference metadata
//!
//! Records looked up by id are cached under the id string. Records looked up
//! by mnemonic are cached under `"{ResourceType}:{mnemonic}"`, so a concept
//! and a concept set sharing a mnemonic do not collide.

use crate::cache::{Cacheable, MetadataCache};
use crate::error::Result;
use hie_client::{typed, DataServiceClient, Query};
use hie_models::{AssigningAuthority, Concept, ConceptSet, ReferenceTerm, Resource};
use std::sync::Arc;
use uuid::Uuid;

pub struct MetadataLookup {
    client: Arc<dyn DataServiceClient>,
    cache: Arc<MetadataCache>,
}

impl MetadataLookup {
    pub fn new(client: Arc<dyn DataServiceClient>, cache: Arc<MetadataCache>) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    pub async fn concept(&self, id: Uuid) -> Result<Option<Arc<Concept>>> {
        self.by_id(id, |c: &Concept| c.id == id).await
    }

    pub async fn concept_by_mnemonic(&self, mnemonic: &str) -> Result<Option<Arc<Concept>>> {
        self.by_property("mnemonic", mnemonic, |c: &Concept| c.mnemonic == mnemonic)
            .await
    }

    pub async fn concept_set_by_mnemonic(
        &self,
        mnemonic: &str,
    ) -> Result<Option<Arc<ConceptSet>>> {
        self.by_property("mnemonic", mnemonic, |s: &ConceptSet| s.mnemonic == mnemonic)
            .await
    }

    pub async fn assigning_authority(&self, id: Uuid) -> Result<Option<Arc<AssigningAuthority>>> {
        self.by_id(id, |a: &AssigningAuthority| a.id == id).await
    }

    /// Authority by its domain name, the mnemonic identifiers refer to
    pub async fn assigning_authority_by_domain(
        &self,
        domain_name: &str,
    ) -> Result<Option<Arc<AssigningAuthority>>> {
        self.by_property("domainName", domain_name, |a: &AssigningAuthority| {
            a.domain_name == domain_name
        })
        .await
    }

    pub async fn reference_term_by_mnemonic(
        &self,
        mnemonic: &str,
    ) -> Result<Option<Arc<ReferenceTerm>>> {
        self.by_property("mnemonic", mnemonic, |t: &ReferenceTerm| t.mnemonic == mnemonic)
            .await
    }

    async fn by_id<R, F>(&self, id: Uuid, matches: F) -> Result<Option<Arc<R>>>
    where
        R: Resource + Cacheable,
        F: Fn(&R) -> bool,
    {
        let key = id.to_string();
        let query = Query::new().filter("id", id).active();
        self.cache
            .get_or_fetch(&key, || self.fetch::<R, F>(query, matches))
            .await
    }

    async fn by_property<R, F>(&self, path: &str, value: &str, matches: F) -> Result<Option<Arc<R>>>
    where
        R: Resource + Cacheable,
        F: Fn(&R) -> bool,
    {
        let key = mnemonic_key(R::RESOURCE_TYPE, value);
        let query = Query::new().filter(path, value).active();
        self.cache
            .get_or_fetch(&key, || self.fetch::<R, F>(query, matches))
            .await
    }

    async fn fetch<R, F>(&self, query: Query, matches: F) -> Result<Option<R>>
    where
        R: Resource,
        F: Fn(&R) -> bool,
    {
        let mut bundle = typed::query_all::<R>(self.client.as_ref(), &query).await?;
        bundle.reconstitute();
        Ok(bundle.find_active(matches)?)
    }
}

/// Cache key for a record looked up by mnemonic
pub fn mnemonic_key(resource_type: &str, mnemonic: &str) -> String {
    format!("{resource_type}:{mnemonic}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonic_keys_are_scoped_by_type() {
        assert_eq!(mnemonic_key("Concept", "Parent"), "Concept:Parent");
        assert_ne!(
            mnemonic_key("Concept", "Parent"),
            mnemonic_key("ConceptSet", "Parent")
        );
    }
}
