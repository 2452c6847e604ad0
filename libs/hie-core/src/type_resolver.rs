//! String tag → entity kind resolution
//!
//! Tags arrive from route parameters and form fields. Surrounding whitespace
//! is ignored and the comparison is ASCII case-insensitive, so `"place"`,
//! `" Place "` and `"PLACE"` all resolve to [`EntityKind::Place`].

use crate::error::{Error, Result};
use hie_models::EntityKind;

pub fn resolve(tag: &str) -> Result<EntityKind> {
    let normalized = tag.trim();
    EntityKind::ALL
        .into_iter()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(normalized))
        .ok_or_else(|| Error::UnsupportedType(tag.to_string()))
}

/// Canonical tags of every supported kind
pub fn supported_tags() -> impl Iterator<Item = &'static str> {
    EntityKind::ALL.into_iter().map(|kind| kind.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_every_supported_tag() {
        for kind in EntityKind::ALL {
            assert_eq!(resolve(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        assert_eq!(resolve("place").unwrap(), EntityKind::Place);
        assert_eq!(resolve("  MANUFACTUREDMATERIAL\t").unwrap(), EntityKind::ManufacturedMaterial);
        assert_eq!(resolve("organization").unwrap(), EntityKind::Organization);
    }

    #[test]
    fn test_unknown_tag_is_unsupported() {
        for tag in ["", "Person", "Places", "Manufactured Material", "Entity"] {
            match resolve(tag) {
                Err(Error::UnsupportedType(t)) => assert_eq!(t, tag),
                other => panic!("expected UnsupportedType for {tag:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_supported_tags_lists_all_kinds() {
        let tags: Vec<_> = supported_tags().collect();
        assert_eq!(
            tags,
            vec!["Place", "Material", "ManufacturedMaterial", "Organization"]
        );
    }
}
