//! `get` and `relationships` commands

use super::print_json;
use crate::OutputFormat;
use anyhow::Context;
use hie_core::{AdminContext, RelationshipView};
use hie_models::EntityRecord;
use uuid::Uuid;

pub async fn get(ctx: &AdminContext, tag: &str, id: Uuid, format: OutputFormat) -> anyhow::Result<()> {
    let record = ctx
        .accessor
        .get_by_tag(id, tag)
        .await
        .with_context(|| format!("Failed to get {tag} {id}"))?;

    match format {
        OutputFormat::Json => print_json(&record),
        OutputFormat::Text => {
            for line in describe(&record) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

pub async fn relationships(
    ctx: &AdminContext,
    tag: &str,
    id: Uuid,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let record = ctx
        .accessor
        .get_by_tag(id, tag)
        .await
        .with_context(|| format!("Failed to get {tag} {id}"))?;
    let views = ctx
        .reconciler
        .reconcile_default(&record)
        .await
        .with_context(|| format!("Failed to reconcile relationships of {tag} {id}"))?;

    match format {
        OutputFormat::Json => print_json(&views),
        OutputFormat::Text => {
            if views.is_empty() {
                println!("{} has no current relationships", record.entity().display_name());
            }
            for view in &views {
                println!("{}", relationship_line(view));
            }
            Ok(())
        }
    }
}

fn describe(record: &EntityRecord) -> Vec<String> {
    let entity = record.entity();
    let mut lines = vec![
        format!("{} {}", record.kind(), entity.id),
        format!("  name:      {}", entity.display_name()),
    ];
    if let Some(version) = entity.version_id {
        lines.push(format!("  version:   {version}"));
    }
    if entity.is_obsolete() {
        lines.push("  status:    obsolete".to_string());
    }
    for identifier in &entity.identifiers {
        let authority = identifier
            .authority_model
            .as_ref()
            .map(|a| a.domain_name.clone())
            .unwrap_or_else(|| identifier.authority.to_string());
        lines.push(format!("  identifier {authority}: {}", identifier.value));
    }
    lines.push(format!("  relationships: {}", entity.relationships.len()));
    lines
}

fn relationship_line(view: &RelationshipView) -> String {
    let type_name = view
        .type_name
        .clone()
        .unwrap_or_else(|| view.display_type.to_string());
    let counterpart = view
        .counterpart_name
        .clone()
        .unwrap_or_else(|| view.counterpart_id.to_string());
    let arrow = if view.inverse { "<-" } else { "->" };
    format!("{type_name:<32} {arrow} {counterpart}")
}
