//! Reference metadata served by the administrative-metadata service
//!
//! These records change rarely and are read far more often than they are
//! written, which is why the core keeps them behind a read-through cache.

use super::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Localized display name of a concept or reference term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptName {
    pub language: String,
    pub value: String,
}

/// A coded concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: Uuid,

    pub mnemonic: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_concept: Option<Uuid>,

    #[serde(default, rename = "name", skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<ConceptName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obsoletion_time: Option<DateTime<Utc>>,
}

impl Concept {
    /// Display name in `language`, falling back to the first name, then the mnemonic
    pub fn display_name(&self, language: &str) -> &str {
        self.names
            .iter()
            .find(|n| n.language.eq_ignore_ascii_case(language))
            .or_else(|| self.names.first())
            .map(|n| n.value.as_str())
            .unwrap_or(&self.mnemonic)
    }
}

impl Resource for Concept {
    const RESOURCE_TYPE: &'static str = "Concept";

    fn id(&self) -> Option<Uuid> {
        Some(self.id)
    }

    fn obsoletion_time(&self) -> Option<DateTime<Utc>> {
        self.obsoletion_time
    }
}

/// A named grouping of concepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptSet {
    pub id: Uuid,

    pub mnemonic: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Member concept keys
    #[serde(default, rename = "concept")]
    pub concepts: Vec<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obsoletion_time: Option<DateTime<Utc>>,
}

impl ConceptSet {
    pub fn contains(&self, concept: Uuid) -> bool {
        self.concepts.contains(&concept)
    }
}

impl Resource for ConceptSet {
    const RESOURCE_TYPE: &'static str = "ConceptSet";

    fn id(&self) -> Option<Uuid> {
        Some(self.id)
    }

    fn obsoletion_time(&self) -> Option<DateTime<Utc>> {
        self.obsoletion_time
    }
}

/// Namespace owner for entity identifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigningAuthority {
    pub id: Uuid,

    pub name: String,

    /// Short mnemonic for the namespace, e.g. `NHID`
    pub domain_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Regular expression every identifier value must match in full
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obsoletion_time: Option<DateTime<Utc>>,
}

impl AssigningAuthority {
    /// The configured format rule, if one is set and non-blank
    pub fn format_rule(&self) -> Option<&str> {
        self.validation_regex
            .as_deref()
            .map(str::trim)
            .filter(|rule| !rule.is_empty())
    }
}

impl Resource for AssigningAuthority {
    const RESOURCE_TYPE: &'static str = "AssigningAuthority";

    fn id(&self) -> Option<Uuid> {
        Some(self.id)
    }

    fn obsoletion_time(&self) -> Option<DateTime<Utc>> {
        self.obsoletion_time
    }
}

/// A code from an external code system mapped to concepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTerm {
    pub id: Uuid,

    pub mnemonic: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_system: Option<Uuid>,

    #[serde(default, rename = "name", skip_serializing_if = "Vec::is_empty")]
    pub display_names: Vec<ConceptName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obsoletion_time: Option<DateTime<Utc>>,
}

impl Resource for ReferenceTerm {
    const RESOURCE_TYPE: &'static str = "ReferenceTerm";

    fn id(&self) -> Option<Uuid> {
        Some(self.id)
    }

    fn obsoletion_time(&self) -> Option<DateTime<Utc>> {
        self.obsoletion_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_concept_display_name_prefers_language() {
        let concept: Concept = serde_json::from_value(json!({
            "id": "bfcbb345-86db-43ba-b47e-e7411276ac7c",
            "mnemonic": "Parent",
            "name": [
                {"language": "fr", "value": "Parent (fr)"},
                {"language": "en", "value": "Parent"}
            ]
        }))
        .unwrap();

        assert_eq!(concept.display_name("EN"), "Parent");
        assert_eq!(concept.display_name("sw"), "Parent (fr)");
    }

    #[test]
    fn test_concept_display_name_falls_back_to_mnemonic() {
        let concept: Concept = serde_json::from_value(json!({
            "id": "739457d0-835a-4a9c-811c-42b5e92ed1ca",
            "mnemonic": "Child"
        }))
        .unwrap();

        assert_eq!(concept.display_name("en"), "Child");
    }

    #[test]
    fn test_blank_format_rule_is_none() {
        let authority: AssigningAuthority = serde_json::from_value(json!({
            "id": "a1b2c3d4-0000-4000-8000-000000000001",
            "name": "National Health ID",
            "domainName": "NHID",
            "validationRegex": "   "
        }))
        .unwrap();

        assert_eq!(authority.format_rule(), None);
        assert!(!authority.is_obsolete());
    }
}
