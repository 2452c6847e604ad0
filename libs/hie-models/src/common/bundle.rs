//! Query result bundles
//!
//! A bundle carries the records matching a query plus any related records the
//! service chose to include. Items refer to each other by id (`"target":
//! "<uuid>"`); [`Bundle::reconstitute`] resolves those references into the
//! sibling `...Model` properties so callers can traverse them.

use super::error::{Error, Result};
use super::resource::Resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Discriminator property carried by every bundle item
pub const TYPE_PROPERTY: &str = "$type";

const MODEL_SUFFIX: &str = "Model";

/// A (possibly paged) batch of records returned by a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default, rename = "item")]
    pub items: Vec<Value>,

    #[serde(default)]
    pub offset: usize,

    #[serde(default)]
    pub count: usize,

    #[serde(default)]
    pub total_results: usize,

    #[serde(skip)]
    reconstituted: bool,
}

impl Bundle {
    pub fn new(items: Vec<Value>) -> Self {
        let count = items.len();
        Self {
            items,
            offset: 0,
            count,
            total_results: count,
            reconstituted: false,
        }
    }

    /// Parse from JSON Value
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(Error::from)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_reconstituted(&self) -> bool {
        self.reconstituted
    }

    /// Resolve id references between items into `...Model` properties.
    ///
    /// Only one level is linked: the inserted models are copies of the items as
    /// they were received. Properties that already carry a model are left alone.
    pub fn reconstitute(&mut self) {
        if self.reconstituted {
            return;
        }

        let index: HashMap<String, Value> = self
            .items
            .iter()
            .filter_map(|item| {
                item.get("id")
                    .and_then(Value::as_str)
                    .map(|id| (id.to_ascii_lowercase(), item.clone()))
            })
            .collect();

        if !index.is_empty() {
            for item in &mut self.items {
                link_references(item, &index);
            }
        }

        self.reconstituted = true;
    }

    /// Items of type `R`, in bundle order.
    ///
    /// Items carrying a different `$type` are skipped; items without one are
    /// assumed to be of the queried type.
    pub fn resources<R: Resource>(&self) -> Result<Vec<R>> {
        if !self.reconstituted {
            return Err(Error::NotReconstituted);
        }

        self.items
            .iter()
            .filter(|item| is_of_type(item, R::RESOURCE_TYPE))
            .map(|item| serde_json::from_value(item.clone()).map_err(Error::from))
            .collect()
    }

    /// First non-obsolete item of type `R` satisfying `predicate`
    pub fn find_active<R, F>(&self, predicate: F) -> Result<Option<R>>
    where
        R: Resource,
        F: Fn(&R) -> bool,
    {
        Ok(self
            .resources::<R>()?
            .into_iter()
            .find(|r| !r.is_obsolete() && predicate(r)))
    }
}

fn is_of_type(item: &Value, resource_type: &str) -> bool {
    match item.get(TYPE_PROPERTY).and_then(Value::as_str) {
        Some(declared) => declared == resource_type,
        None => true,
    }
}

fn link_references(value: &mut Value, index: &HashMap<String, Value>) {
    match value {
        Value::Object(map) => {
            let mut links = Vec::new();
            for (key, field) in map.iter() {
                if key == "id" || key == "version" || key.ends_with(MODEL_SUFFIX) {
                    continue;
                }
                let Some(reference) = field.as_str() else {
                    continue;
                };
                let model_key = format!("{key}{MODEL_SUFFIX}");
                let missing = map.get(&model_key).map_or(true, Value::is_null);
                if missing {
                    if let Some(target) = index.get(&reference.to_ascii_lowercase()) {
                        links.push((model_key, target.clone()));
                    }
                }
            }

            for (key, field) in map.iter_mut() {
                if !key.ends_with(MODEL_SUFFIX) {
                    link_references(field, index);
                }
            }

            for (key, model) in links {
                map.insert(key, model);
            }
        }
        Value::Array(items) => {
            for item in items {
                link_references(item, index);
            }
        }
        _ => {}
    }
}
