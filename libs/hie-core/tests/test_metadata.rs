//! Metadata lookups through the shared cache, and identifier assignment

mod test_support;

use hie_core::identifier::{add_identifier, validate};
use hie_core::{EntityAccessor, Error, MetadataCache, MetadataLookup};
use hie_models::{EntityKind, Identifier};
use serde_json::json;
use std::sync::Arc;
use test_support::{authority, concept, uuid, InMemoryService};

fn lookup(service: &Arc<InMemoryService>) -> MetadataLookup {
    MetadataLookup::new(service.clone(), Arc::new(MetadataCache::default()))
}

#[tokio::test]
async fn repeated_authority_lookup_queries_once() {
    let service = Arc::new(
        InMemoryService::new().with("AssigningAuthority", authority(uuid(0xA1), "NHID", None)),
    );
    let lookup = lookup(&service);

    let first = lookup
        .assigning_authority_by_domain("NHID")
        .await
        .unwrap()
        .expect("authority should be found");
    assert_eq!(service.query_count("AssigningAuthority"), 1);

    let second = lookup
        .assigning_authority_by_domain("NHID")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(service.query_count("AssigningAuthority"), 1);
    assert!(Arc::ptr_eq(&first, &second));

    let stats = lookup.cache().stats();
    assert_eq!(stats.fetches, 1);
    assert!(stats.hits >= 1);
}

#[tokio::test]
async fn id_and_mnemonic_lookups_are_cached_separately() {
    let service = Arc::new(
        InMemoryService::new().with("AssigningAuthority", authority(uuid(0xA1), "NHID", None)),
    );
    let lookup = lookup(&service);

    lookup.assigning_authority_by_domain("NHID").await.unwrap();
    let by_id = lookup.assigning_authority(uuid(0xA1)).await.unwrap().unwrap();

    assert_eq!(by_id.domain_name, "NHID");
    assert_eq!(service.query_count("AssigningAuthority"), 2);
}

#[tokio::test]
async fn missing_mnemonic_is_looked_up_every_time() {
    let service = Arc::new(InMemoryService::new());
    let lookup = lookup(&service);

    for _ in 0..2 {
        assert!(lookup.concept_by_mnemonic("Unknown").await.unwrap().is_none());
    }
    assert_eq!(service.query_count("Concept"), 2);
    assert!(lookup.cache().is_empty());
}

#[tokio::test]
async fn obsolete_concepts_are_not_returned() {
    let mut retired = concept(uuid(0xC1), "Retired");
    retired["obsoletionTime"] = json!("2024-01-01T00:00:00Z");
    let service = Arc::new(
        InMemoryService::new()
            .with("Concept", retired)
            .with("Concept", concept(uuid(0xC2), "Parent")),
    );
    let lookup = lookup(&service);

    assert!(lookup.concept(uuid(0xC1)).await.unwrap().is_none());
    let parent = lookup.concept_by_mnemonic("Parent").await.unwrap().unwrap();
    assert_eq!(parent.id, uuid(0xC2));
}

#[tokio::test]
async fn concept_and_set_with_same_mnemonic_do_not_collide() {
    let service = Arc::new(
        InMemoryService::new()
            .with("Concept", concept(uuid(0xC1), "VaccineType"))
            .with(
                "ConceptSet",
                json!({
                    "id": uuid(0xD1),
                    "mnemonic": "VaccineType",
                    "name": "Vaccine types",
                    "concept": [uuid(0xC1)]
                }),
            ),
    );
    let lookup = lookup(&service);

    let concept = lookup.concept_by_mnemonic("VaccineType").await.unwrap().unwrap();
    let set = lookup
        .concept_set_by_mnemonic("VaccineType")
        .await
        .unwrap()
        .unwrap();
    assert!(set.contains(concept.id));
}

#[tokio::test]
async fn lookup_failure_is_a_remote_service_error() {
    let service = Arc::new(InMemoryService::new());
    service.fail("ReferenceTerm");
    let lookup = lookup(&service);

    let err = lookup.reference_term_by_mnemonic("BCG").await.unwrap_err();
    assert!(matches!(err, Error::RemoteService(_)));
    assert!(!err.is_validation());
}

#[tokio::test]
async fn adding_identifier_to_material_keeps_existing_one() {
    let material_id = uuid(0x10);
    let lot_authority = uuid(0xA2);
    let service = Arc::new(
        InMemoryService::new()
            .with(
                "AssigningAuthority",
                authority(lot_authority, "GTIN", Some(r"^[A-Z]{2}\d{4}$")),
            )
            .with(
                "Material",
                json!({
                    "$type": "Material",
                    "id": material_id,
                    "name": "Oral polio vaccine",
                    "identifier": [{ "authority": uuid(0xA3), "value": "OPV-1" }]
                }),
            ),
    );
    let cache = Arc::new(MetadataCache::default());
    let lookup = MetadataLookup::new(service.clone(), cache.clone());
    let accessor = EntityAccessor::new(service.clone(), cache);

    let gtin = lookup
        .assigning_authority_by_domain("GTIN")
        .await
        .unwrap()
        .unwrap();
    let mut record = accessor.get_by_tag(material_id, "Material").await.unwrap();

    let err = add_identifier(record.entity_mut(), &gtin, "ab12").unwrap_err();
    assert!(matches!(err, Error::FormatInvalid { .. }));
    assert!(validate(&gtin, "AB1234").is_ok());

    add_identifier(record.entity_mut(), &gtin, "AB1234").unwrap();
    assert_eq!(record.entity().identifiers.len(), 2);

    let updated = accessor.update(record).await.unwrap();
    assert_eq!(updated.kind(), EntityKind::Material);

    let submitted: Vec<Identifier> =
        serde_json::from_value(service.submitted()[0].1["identifier"].clone()).unwrap();
    let values: Vec<_> = submitted.iter().map(|i| i.value.as_str()).collect();
    assert_eq!(values, vec!["OPV-1", "AB1234"]);
}
