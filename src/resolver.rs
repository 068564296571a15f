//! Translate caller-supplied module names into catalog descriptors.
//!
//! No caller handles raw name strings past this boundary: a request either
//! resolves to a descriptor here or fails as a client error.

use crate::catalog::{Catalog, EntityDescriptor};
use crate::error::AppError;

/// Case-insensitive, whitespace-tolerant lookup. Pure; the returned
/// descriptor keeps its stored canonical name, normalization never leaks
/// back to the caller.
pub fn resolve<'a>(catalog: &'a Catalog, module_name: &str) -> Result<&'a EntityDescriptor, AppError> {
    let trimmed = module_name.trim();
    catalog
        .lookup(trimmed)
        .ok_or_else(|| AppError::UnknownEntity(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{resolve_catalog, CatalogConfig};

    fn catalog() -> Catalog {
        let config: CatalogConfig = serde_json::from_value(serde_json::json!({
            "entities": [
                { "name": "City", "table": "cities", "fields": [
                    { "name": "name", "type": "text", "nullable": false }
                ]}
            ]
        }))
        .unwrap();
        resolve_catalog(&config).unwrap()
    }

    #[test]
    fn resolves_any_casing_to_the_canonical_name() {
        let catalog = catalog();
        for name in ["city", "City", "CITY", "cItY"] {
            let entity = resolve(&catalog, name).expect(name);
            assert_eq!(entity.canonical_name, "City");
        }
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let catalog = catalog();
        let entity = resolve(&catalog, "  city \t").unwrap();
        assert_eq!(entity.canonical_name, "City");
    }

    #[test]
    fn near_misses_fail_with_unknown_entity() {
        let catalog = catalog();
        for name in ["Cityy", "cit", "citie", ""] {
            match resolve(&catalog, name) {
                Err(AppError::UnknownEntity(n)) => assert_eq!(n, name.trim()),
                other => panic!("expected UnknownEntity for {name:?}, got {other:?}"),
            }
        }
    }
}
