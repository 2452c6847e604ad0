//! Common behaviour of every record the remote services exchange

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// A record addressable through the remote service interface.
///
/// `RESOURCE_TYPE` is the type segment the services use in their routes and
/// the `$type` discriminator carried inside bundles.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const RESOURCE_TYPE: &'static str;

    /// Stable identity, absent on records that were never persisted
    fn id(&self) -> Option<Uuid>;

    /// Soft-delete marker; `None` while the record is active
    fn obsoletion_time(&self) -> Option<DateTime<Utc>>;

    fn is_obsolete(&self) -> bool {
        self.obsoletion_time().is_some()
    }
}
