//! Identifier validation and editing
//!
//! An identifier value must be non-empty and, when its assigning authority
//! declares a format rule, must match that rule in full. A rule of `\d{5}`
//! therefore rejects `"123456"` even though it contains five digits.

use crate::error::{Error, Result};
use hie_models::{AssigningAuthority, Entity, Identifier};
use regex::Regex;
use uuid::Uuid;

/// Whether `value` is acceptable under `authority`
pub fn is_valid(authority: &AssigningAuthority, value: &str) -> bool {
    validate(authority, value).is_ok()
}

/// Check `value` against `authority`'s format rule.
///
/// Fails with [`Error::FormatInvalid`] on an empty value or a value the rule
/// does not match, and with [`Error::Validation`] on the `validationRegex`
/// field when the authority's rule itself does not compile.
pub fn validate(authority: &AssigningAuthority, value: &str) -> Result<()> {
    let rule = authority.format_rule();

    if value.trim().is_empty() {
        return Err(format_invalid(value, rule.unwrap_or("a non-empty value")));
    }

    let Some(rule) = rule else {
        return Ok(());
    };

    if compile(rule)?.is_match(value) {
        Ok(())
    } else {
        Err(format_invalid(value, rule))
    }
}

/// Validate `value` and append it to `entity` as an identifier of `authority`.
///
/// A second identifier with the same authority and value is rejected.
pub fn add_identifier(
    entity: &mut Entity,
    authority: &AssigningAuthority,
    value: &str,
) -> Result<()> {
    validate(authority, value)?;

    let duplicate = entity
        .identifiers
        .iter()
        .any(|existing| existing.authority == authority.id && existing.value == value);
    if duplicate {
        return Err(Error::validation(
            "value",
            format!(
                "identifier '{}' already assigned under {}",
                value, authority.domain_name
            ),
        ));
    }

    let mut identifier = Identifier::new(authority.id, value);
    identifier.authority_model = Some(Box::new(authority.clone()));
    entity.identifiers.push(identifier);
    Ok(())
}

/// Remove the identifier with the given authority and value from `entity`
pub fn remove_identifier(entity: &mut Entity, authority: Uuid, value: &str) -> Result<Identifier> {
    let position = entity
        .identifiers
        .iter()
        .position(|existing| existing.authority == authority && existing.value == value)
        .ok_or_else(|| Error::not_found("EntityIdentifier", format!("{authority}/{value}")))?;
    Ok(entity.identifiers.remove(position))
}

/// Collect every problem that would make `candidate` clash with `existing`.
///
/// Only active authorities other than the candidate itself are compared.
/// Nothing is fetched; the caller supplies the authorities to check against.
pub fn check_authority_uniqueness(
    candidate: &AssigningAuthority,
    existing: &[AssigningAuthority],
) -> Vec<Error> {
    let mut errors = Vec::new();
    let others: Vec<&AssigningAuthority> = existing
        .iter()
        .filter(|other| other.id != candidate.id && other.obsoletion_time.is_none())
        .collect();

    if others.iter().any(|other| other.name == candidate.name) {
        errors.push(duplicate("name", &candidate.name));
    }
    if others
        .iter()
        .any(|other| other.domain_name.eq_ignore_ascii_case(&candidate.domain_name))
    {
        errors.push(duplicate("domainName", &candidate.domain_name));
    }
    if let Some(oid) = candidate.oid.as_deref().filter(|oid| !oid.is_empty()) {
        if others.iter().any(|other| other.oid.as_deref() == Some(oid)) {
            errors.push(duplicate("oid", oid));
        }
    }
    if let Some(rule) = candidate.format_rule() {
        if let Err(err) = compile(rule) {
            errors.push(err);
        }
    }

    errors
}

fn compile(rule: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{rule})$"))
        .map_err(|err| Error::validation("validationRegex", err.to_string()))
}

fn format_invalid(value: &str, rule: &str) -> Error {
    Error::FormatInvalid {
        field: "value".to_string(),
        value: value.to_string(),
        rule: rule.to_string(),
    }
}

fn duplicate(field: &str, value: &str) -> Error {
    Error::validation(field, format!("'{value}' is already used by another authority"))
}
