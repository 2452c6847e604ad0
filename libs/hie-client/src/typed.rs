//! Typed helpers over [`DataServiceClient`]
//!
//! The service trait is object-safe and works on JSON; these functions pick
//! the route from `R::RESOURCE_TYPE` and (de)serialize the model.

use crate::client::DataServiceClient;
use crate::error::{Error, Result};
use crate::query::Query;
use hie_models::bundle::TYPE_PROPERTY;
use hie_models::{Bundle, Resource};
use serde_json::Value as JsonValue;
use uuid::Uuid;

pub async fn query_as<R: Resource>(
    client: &dyn DataServiceClient,
    query: &Query,
) -> Result<Bundle> {
    client.query(R::RESOURCE_TYPE, query).await
}

/// Run `query` across every page the service splits its results into.
///
/// Pages are requested at increasing `_offset` until `totalResults` matches
/// are held, and concatenated into one bundle. A page that comes back empty
/// before then fails the whole call rather than returning a partial set.
pub async fn query_all<R: Resource>(
    client: &dyn DataServiceClient,
    query: &Query,
) -> Result<Bundle> {
    let start = query.offset.unwrap_or(0);
    let first = client.query(R::RESOURCE_TYPE, query).await?;
    let total = first.total_results;
    let mut fetched = page_len(&first);
    let mut items = first.items;

    while start + fetched < total {
        let page = client
            .query(R::RESOURCE_TYPE, &query.clone().offset(start + fetched))
            .await?;
        let len = page_len(&page);
        if len == 0 {
            return Err(Error::Service(format!(
                "{} query ended after {} of {} results",
                R::RESOURCE_TYPE,
                start + fetched,
                total
            )));
        }
        tracing::trace!(
            resource_type = R::RESOURCE_TYPE,
            offset = start + fetched,
            count = len,
            total,
            "fetched result page"
        );
        fetched += len;
        items.extend(page.items);
    }

    let mut bundle = Bundle::new(items);
    bundle.offset = start;
    bundle.count = fetched;
    bundle.total_results = total.max(start + fetched);
    Ok(bundle)
}

/// Matches carried by a page; included related records are not counted
fn page_len(bundle: &Bundle) -> usize {
    if bundle.count > 0 {
        bundle.count
    } else {
        bundle.items.len()
    }
}

/// Fetch the current (or a historical) version of a record.
pub async fn get_as<R: Resource>(
    client: &dyn DataServiceClient,
    id: Uuid,
    version_id: Option<Uuid>,
) -> Result<Option<R>> {
    match client.get(R::RESOURCE_TYPE, id, version_id).await? {
        Some(body) => decode::<R>(body).map(Some),
        None => Ok(None),
    }
}

pub async fn create_as<R: Resource>(
    client: &dyn DataServiceClient,
    resource: &R,
) -> Result<R> {
    let body = client.create(R::RESOURCE_TYPE, encode(resource)?).await?;
    decode(body)
}

pub async fn update_as<R: Resource>(
    client: &dyn DataServiceClient,
    id: Uuid,
    resource: &R,
) -> Result<R> {
    let body = client.update(R::RESOURCE_TYPE, id, encode(resource)?).await?;
    decode(body)
}

pub async fn obsolete_as<R: Resource>(
    client: &dyn DataServiceClient,
    id: Uuid,
) -> Result<R> {
    let body = client.obsolete(R::RESOURCE_TYPE, id).await?;
    decode(body)
}

/// Serialize a model for submission, stamping its `$type` discriminator.
pub fn encode<R: Resource>(resource: &R) -> Result<JsonValue> {
    let mut body = serde_json::to_value(resource).map_err(|source| Error::Decode {
        resource_type: R::RESOURCE_TYPE.to_string(),
        source,
    })?;
    if let Some(map) = body.as_object_mut() {
        map.insert(
            TYPE_PROPERTY.to_string(),
            JsonValue::String(R::RESOURCE_TYPE.to_string()),
        );
    }
    Ok(body)
}

pub fn decode<R: Resource>(body: JsonValue) -> Result<R> {
    serde_json::from_value(body).map_err(|source| Error::Decode {
        resource_type: R::RESOURCE_TYPE.to_string(),
        source,
    })
}
