//! `authority` and `validate-identifier` commands

use super::print_json;
use crate::OutputFormat;
use anyhow::{bail, Context};
use hie_core::{identifier, AdminContext};
use hie_models::AssigningAuthority;
use serde_json::json;
use std::sync::Arc;

async fn find(ctx: &AdminContext, domain: &str) -> anyhow::Result<Arc<AssigningAuthority>> {
    match ctx
        .lookup
        .assigning_authority_by_domain(domain)
        .await
        .with_context(|| format!("Failed to look up assigning authority {domain}"))?
    {
        Some(authority) => Ok(authority),
        None => bail!("No active assigning authority with domain name '{domain}'"),
    }
}

pub async fn show(ctx: &AdminContext, domain: &str, format: OutputFormat) -> anyhow::Result<()> {
    let authority = find(ctx, domain).await?;

    match format {
        OutputFormat::Json => print_json(authority.as_ref()),
        OutputFormat::Text => {
            println!("{} ({})", authority.name, authority.domain_name);
            println!("  id:    {}", authority.id);
            if let Some(oid) = &authority.oid {
                println!("  oid:   {oid}");
            }
            if let Some(url) = &authority.url {
                println!("  url:   {url}");
            }
            println!("  rule:  {}", authority.format_rule().unwrap_or("(none)"));
            Ok(())
        }
    }
}

pub async fn validate_identifier(
    ctx: &AdminContext,
    domain: &str,
    value: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let authority = find(ctx, domain).await?;
    let outcome = identifier::validate(&authority, value);

    match format {
        OutputFormat::Json => print_json(&json!({
            "domainName": authority.domain_name,
            "value": value,
            "valid": outcome.is_ok(),
            "field": outcome.as_ref().err().and_then(|e| e.field()),
            "error": outcome.as_ref().err().map(ToString::to_string),
        }))?,
        OutputFormat::Text => match &outcome {
            Ok(()) => println!("'{value}' is a valid {} identifier", authority.domain_name),
            Err(err) => println!("'{value}' is not a valid {} identifier: {err}", authority.domain_name),
        },
    }

    outcome.map_err(|err| anyhow::anyhow!(err).context("Identifier rejected"))
}
