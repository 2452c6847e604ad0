//! Versioned entity records
//!
//! Every kind shares the [`Entity`] core (identity, version, identifiers,
//! relationships, soft-delete marker) and adds its own fields on top. The
//! core is flattened into each kind so the wire shape stays a single object.

use super::identifier::Identifier;
use super::kind::EntityKind;
use super::relationship::Relationship;
use super::resource::Resource;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fields common to every entity kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Immutable identity
    pub id: Uuid,

    /// Current version; cleared before an update so the repository mints a new one
    #[serde(default, rename = "version", skip_serializing_if = "Option::is_none")]
    pub version_id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_concept: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_concept: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_concept: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, rename = "identifier")]
    pub identifiers: Vec<Identifier>,

    #[serde(default, rename = "relationship")]
    pub relationships: Vec<Relationship>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obsoletion_time: Option<DateTime<Utc>>,
}

impl Entity {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name shown in lists; falls back to the id when unnamed
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.id.to_string())
    }

    pub fn is_obsolete(&self) -> bool {
        self.obsoletion_time.is_some()
    }
}

/// Behaviour shared by the concrete entity shapes
pub trait EntityModel: Resource {
    const KIND: EntityKind;

    fn entity(&self) -> &Entity;

    fn entity_mut(&mut self) -> &mut Entity;

    fn into_record(self) -> EntityRecord;

    /// Unwrap a record of this kind; `None` for any other kind
    fn from_record(record: EntityRecord) -> Option<Self>;
}

/// A physical place such as a facility or administrative area
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(flatten)]
    pub entity: Entity,

    #[serde(default)]
    pub is_mobile: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// A kind of material (vaccine, supply) independent of any manufacturer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(flatten)]
    pub entity: Entity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_concept: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_concept: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub is_administrative: bool,
}

/// A manufactured lot of a material
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturedMaterial {
    #[serde(flatten)]
    pub material: Material,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(flatten)]
    pub entity: Entity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_concept: Option<Uuid>,
}

impl Resource for Place {
    const RESOURCE_TYPE: &'static str = "Place";

    fn id(&self) -> Option<Uuid> {
        Some(self.entity.id)
    }

    fn obsoletion_time(&self) -> Option<DateTime<Utc>> {
        self.entity.obsoletion_time
    }
}

impl EntityModel for Place {
    const KIND: EntityKind = EntityKind::Place;

    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    fn into_record(self) -> EntityRecord {
        EntityRecord::Place(self)
    }

    fn from_record(record: EntityRecord) -> Option<Self> {
        match record {
            EntityRecord::Place(place) => Some(place),
            _ => None,
        }
    }
}

impl Resource for Material {
    const RESOURCE_TYPE: &'static str = "Material";

    fn id(&self) -> Option<Uuid> {
        Some(self.entity.id)
    }

    fn obsoletion_time(&self) -> Option<DateTime<Utc>> {
        self.entity.obsoletion_time
    }
}

impl EntityModel for Material {
    const KIND: EntityKind = EntityKind::Material;

    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    fn into_record(self) -> EntityRecord {
        EntityRecord::Material(self)
    }

    fn from_record(record: EntityRecord) -> Option<Self> {
        match record {
            EntityRecord::Material(material) => Some(material),
            _ => None,
        }
    }
}

impl Resource for ManufacturedMaterial {
    const RESOURCE_TYPE: &'static str = "ManufacturedMaterial";

    fn id(&self) -> Option<Uuid> {
        Some(self.material.entity.id)
    }

    fn obsoletion_time(&self) -> Option<DateTime<Utc>> {
        self.material.entity.obsoletion_time
    }
}

impl EntityModel for ManufacturedMaterial {
    const KIND: EntityKind = EntityKind::ManufacturedMaterial;

    fn entity(&self) -> &Entity {
        &self.material.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.material.entity
    }

    fn into_record(self) -> EntityRecord {
        EntityRecord::ManufacturedMaterial(self)
    }

    fn from_record(record: EntityRecord) -> Option<Self> {
        match record {
            EntityRecord::ManufacturedMaterial(material) => Some(material),
            _ => None,
        }
    }
}

impl Resource for Organization {
    const RESOURCE_TYPE: &'static str = "Organization";

    fn id(&self) -> Option<Uuid> {
        Some(self.entity.id)
    }

    fn obsoletion_time(&self) -> Option<DateTime<Utc>> {
        self.entity.obsoletion_time
    }
}

impl EntityModel for Organization {
    const KIND: EntityKind = EntityKind::Organization;

    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    fn into_record(self) -> EntityRecord {
        EntityRecord::Organization(self)
    }

    fn from_record(record: EntityRecord) -> Option<Self> {
        match record {
            EntityRecord::Organization(organization) => Some(organization),
            _ => None,
        }
    }
}

/// An entity of any supported kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum EntityRecord {
    Place(Place),
    Material(Material),
    ManufacturedMaterial(ManufacturedMaterial),
    Organization(Organization),
}

impl EntityRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRecord::Place(_) => EntityKind::Place,
            EntityRecord::Material(_) => EntityKind::Material,
            EntityRecord::ManufacturedMaterial(_) => EntityKind::ManufacturedMaterial,
            EntityRecord::Organization(_) => EntityKind::Organization,
        }
    }

    pub fn entity(&self) -> &Entity {
        match self {
            EntityRecord::Place(place) => place.entity(),
            EntityRecord::Material(material) => material.entity(),
            EntityRecord::ManufacturedMaterial(material) => material.entity(),
            EntityRecord::Organization(organization) => organization.entity(),
        }
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        match self {
            EntityRecord::Place(place) => place.entity_mut(),
            EntityRecord::Material(material) => material.entity_mut(),
            EntityRecord::ManufacturedMaterial(material) => material.entity_mut(),
            EntityRecord::Organization(organization) => organization.entity_mut(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.entity().id
    }
}
