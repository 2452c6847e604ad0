//! Entity administration core
//!
//! Generic access to entities of a runtime-selected kind, relationship
//! reconciliation, identifier validation and a shared cache of reference
//! metadata, all on top of the [`hie_client::DataServiceClient`] interface.
//!
//! # Example
//!
//! ```rust,no_run
//! use hie_client::HttpDataServiceClient;
//! use hie_core::{AdminContext, CacheConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Arc::new(HttpDataServiceClient::new("https://hie.example.org/imsi")?);
//! let metadata = Arc::new(HttpDataServiceClient::new("https://hie.example.org/ami")?);
//! let ctx = AdminContext::new(repository, metadata, &CacheConfig::default());
//!
//! let place = ctx
//!     .accessor
//!     .get_by_tag("5d000000-0000-4000-8000-000000000001".parse()?, "place")
//!     .await?;
//! let views = ctx.reconciler.reconcile_default(&place).await?;
//! println!("{} relationships", views.len());
//! # Ok(())
//! # }
//! ```

pub mod accessor;
pub mod cache;
pub mod context;
pub mod error;
pub mod identifier;
pub mod lookup;
pub mod reconciler;
pub mod relationships;
pub mod type_resolver;

pub use accessor::{prepare_for_update, DispatchTable, EntityAccessor, EntityHandlers};
pub use cache::{CacheConfig, CacheStats, Cacheable, CachedRecord, MetadataCache};
pub use context::AdminContext;
pub use error::{Error, Result};
pub use lookup::MetadataLookup;
pub use reconciler::{
    default_queries, merge_relationships, Direction, RelationshipQuery, RelationshipReconciler,
    RelationshipView,
};
pub use type_resolver::resolve;
