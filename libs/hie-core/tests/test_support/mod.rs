#![allow(dead_code)]

use async_trait::async_trait;
use hie_client::{DataServiceClient, Error, Query, Result};
use hie_models::Bundle;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory data service keyed by resource type.
///
/// Queries match `(path, value)` predicates by string equality on top-level
/// properties; a value of `null` matches absent or null properties.
#[derive(Default)]
pub struct InMemoryService {
    records: Mutex<HashMap<String, Vec<Value>>>,
    queries: Mutex<HashMap<String, usize>>,
    gets: Mutex<HashMap<String, usize>>,
    updates: Mutex<Vec<(String, Value)>>,
    failing: Mutex<HashSet<String>>,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, resource_type: &str, record: Value) -> Self {
        self.insert(resource_type, record);
        self
    }

    pub fn insert(&self, resource_type: &str, record: Value) {
        self.records
            .lock()
            .unwrap()
            .entry(resource_type.to_string())
            .or_default()
            .push(record);
    }

    /// Make every call on `resource_type` fail
    pub fn fail(&self, resource_type: &str) {
        self.failing.lock().unwrap().insert(resource_type.to_string());
    }

    pub fn query_count(&self, resource_type: &str) -> usize {
        self.queries
            .lock()
            .unwrap()
            .get(resource_type)
            .copied()
            .unwrap_or(0)
    }

    pub fn get_count(&self, resource_type: &str) -> usize {
        self.gets
            .lock()
            .unwrap()
            .get(resource_type)
            .copied()
            .unwrap_or(0)
    }

    /// Bodies submitted through `update`, in order
    pub fn submitted(&self) -> Vec<(String, Value)> {
        self.updates.lock().unwrap().clone()
    }

    fn check(&self, resource_type: &str) -> Result<()> {
        if self.failing.lock().unwrap().contains(resource_type) {
            return Err(Error::Service(format!("{resource_type} service unavailable")));
        }
        Ok(())
    }

    fn find(&self, resource_type: &str, id: Uuid) -> Option<Value> {
        let id = id.to_string();
        self.records
            .lock()
            .unwrap()
            .get(resource_type)?
            .iter()
            .find(|record| record["id"].as_str() == Some(id.as_str()))
            .cloned()
    }

    fn replace(&self, resource_type: &str, id: Uuid, body: Value) {
        let id = id.to_string();
        let mut records = self.records.lock().unwrap();
        let list = records.entry(resource_type.to_string()).or_default();
        list.retain(|record| record["id"].as_str() != Some(id.as_str()));
        list.push(body);
    }
}

fn matches(record: &Value, query: &Query) -> bool {
    query.predicate.iter().all(|(path, value)| {
        let field = &record[path.as_str()];
        if value == "null" {
            return field.is_null();
        }
        match field {
            Value::String(s) => s.eq_ignore_ascii_case(value),
            Value::Null => false,
            other => other.to_string() == *value,
        }
    })
}

#[async_trait]
impl DataServiceClient for InMemoryService {
    async fn query(&self, resource_type: &str, query: &Query) -> Result<Bundle> {
        *self
            .queries
            .lock()
            .unwrap()
            .entry(resource_type.to_string())
            .or_default() += 1;
        self.check(resource_type)?;

        let items = self
            .records
            .lock()
            .unwrap()
            .get(resource_type)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| matches(record, query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(Bundle::new(items))
    }

    async fn get(
        &self,
        resource_type: &str,
        id: Uuid,
        _version_id: Option<Uuid>,
    ) -> Result<Option<Value>> {
        *self
            .gets
            .lock()
            .unwrap()
            .entry(resource_type.to_string())
            .or_default() += 1;
        self.check(resource_type)?;
        Ok(self.find(resource_type, id))
    }

    async fn create(&self, resource_type: &str, resource: Value) -> Result<Value> {
        self.check(resource_type)?;
        self.insert(resource_type, resource.clone());
        Ok(resource)
    }

    async fn update(&self, resource_type: &str, id: Uuid, resource: Value) -> Result<Value> {
        self.check(resource_type)?;
        self.updates
            .lock()
            .unwrap()
            .push((resource_type.to_string(), resource.clone()));

        let mut stored = resource;
        stored["version"] = json!(Uuid::new_v4());
        self.replace(resource_type, id, stored.clone());
        Ok(stored)
    }

    async fn obsolete(&self, resource_type: &str, id: Uuid) -> Result<Value> {
        self.check(resource_type)?;
        let mut stored = self.find(resource_type, id).ok_or_else(|| Error::Status {
            resource_type: resource_type.to_string(),
            status: 404,
            message: format!("{id} not found"),
        })?;
        stored["obsoletionTime"] = json!("2026-01-01T00:00:00Z");
        self.replace(resource_type, id, stored.clone());
        Ok(stored)
    }
}

/// Serves an [`InMemoryService`]'s query results `page_size` at a time,
/// reporting the full match count in `totalResults`.
pub struct PagedService {
    inner: Arc<InMemoryService>,
    page_size: usize,
}

impl PagedService {
    pub fn new(inner: Arc<InMemoryService>, page_size: usize) -> Self {
        Self { inner, page_size }
    }
}

#[async_trait]
impl DataServiceClient for PagedService {
    async fn query(&self, resource_type: &str, query: &Query) -> Result<Bundle> {
        let all = self.inner.query(resource_type, query).await?;
        let offset = query.offset.unwrap_or(0);
        let page: Vec<Value> = all
            .items
            .iter()
            .skip(offset)
            .take(self.page_size)
            .cloned()
            .collect();

        let mut bundle = Bundle::new(page);
        bundle.offset = offset;
        bundle.total_results = all.items.len();
        Ok(bundle)
    }

    async fn get(
        &self,
        resource_type: &str,
        id: Uuid,
        version_id: Option<Uuid>,
    ) -> Result<Option<Value>> {
        self.inner.get(resource_type, id, version_id).await
    }

    async fn create(&self, resource_type: &str, resource: Value) -> Result<Value> {
        self.inner.create(resource_type, resource).await
    }

    async fn update(&self, resource_type: &str, id: Uuid, resource: Value) -> Result<Value> {
        self.inner.update(resource_type, id, resource).await
    }

    async fn obsolete(&self, resource_type: &str, id: Uuid) -> Result<Value> {
        self.inner.obsolete(resource_type, id).await
    }
}

pub fn uuid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn place(id: Uuid, name: &str) -> Value {
    json!({
        "$type": "Place",
        "id": id,
        "name": name,
        "version": Uuid::new_v4(),
        "relationship": []
    })
}

pub fn relationship(id: Uuid, source: Uuid, target: Uuid, relationship_type: Uuid) -> Value {
    json!({
        "$type": "EntityRelationship",
        "id": id,
        "source": source,
        "target": target,
        "relationshipType": relationship_type
    })
}

pub fn concept(id: Uuid, mnemonic: &str) -> Value {
    json!({
        "$type": "Concept",
        "id": id,
        "mnemonic": mnemonic
    })
}

pub fn authority(id: Uuid, domain_name: &str, rule: Option<&str>) -> Value {
    json!({
        "$type": "AssigningAuthority",
        "id": id,
        "name": format!("{domain_name} registry"),
        "domainName": domain_name,
        "validationRegex": rule
    })
}
