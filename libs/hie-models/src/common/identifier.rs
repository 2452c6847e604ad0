//! Entity identifiers

use super::metadata::AssigningAuthority;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An alternate identifier attached to an entity, scoped by the
/// assigning authority that issued it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// Key of the assigning authority
    pub authority: Uuid,

    pub value: String,

    /// Populated by bundle reconstitution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority_model: Option<Box<AssigningAuthority>>,
}

impl Identifier {
    pub fn new(authority: Uuid, value: impl Into<String>) -> Self {
        Self {
            id: None,
            authority,
            value: value.into(),
            authority_model: None,
        }
    }
}
