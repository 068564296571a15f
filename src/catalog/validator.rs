//! Catalog validation: unique names and consistent capability tagging.

use crate::catalog::types::{CatalogConfig, EntityConfig, FieldConfig};
use crate::error::CatalogError;
use std::collections::HashSet;

pub fn validate(config: &CatalogConfig) -> Result<(), CatalogError> {
    let mut names: HashSet<String> = HashSet::new();
    for e in &config.entities {
        // Both the code-facing and the storage-facing name must be unique
        // across the whole catalog (lookups match either).
        let mut keys = vec![e.name.to_lowercase(), e.table.to_lowercase()];
        keys.dedup();
        for key in keys {
            if !names.insert(key.clone()) {
                return Err(CatalogError::DuplicateName(key));
            }
        }
        validate_entity(e)?;
    }
    Ok(())
}

fn validate_entity(e: &EntityConfig) -> Result<(), CatalogError> {
    let invalid = |detail: String| CatalogError::InvalidEntity {
        entity: e.name.clone(),
        detail,
    };

    if e.fields.is_empty() {
        return Err(invalid("at least one field required".into()));
    }

    let mut field_names: HashSet<String> = HashSet::new();
    for f in &e.fields {
        if !field_names.insert(f.name.to_lowercase()) {
            return Err(invalid(format!("duplicate field '{}'", f.name)));
        }
    }

    single_tagged(e, "is_soft_deletable", |f| f.is_soft_deletable)?;
    single_tagged(e, "is_status_toggle", |f| f.is_status_toggle)?;
    single_tagged(e, "is_workflow_status", |f| f.is_workflow_status)?;

    for f in &e.fields {
        if f.is_status_toggle && f.is_workflow_status {
            return Err(invalid(format!(
                "field '{}' tagged both is_status_toggle and is_workflow_status, the active marker and the workflow status must be distinct columns",
                f.name
            )));
        }
        if (f.is_soft_deletable || f.is_status_toggle) && !is_boolean_type(&f.type_) {
            return Err(invalid(format!(
                "field '{}' carries a boolean capability tag but has type '{}'",
                f.name, f.type_
            )));
        }
        if f.is_workflow_status && !is_text_type(&f.type_) {
            return Err(invalid(format!(
                "workflow status field '{}' must be text-typed, got '{}'",
                f.name, f.type_
            )));
        }
    }

    Ok(())
}

fn single_tagged(
    e: &EntityConfig,
    tag: &str,
    pred: impl Fn(&FieldConfig) -> bool,
) -> Result<(), CatalogError> {
    let tagged: Vec<&str> = e
        .fields
        .iter()
        .filter(|f| pred(f))
        .map(|f| f.name.as_str())
        .collect();
    if tagged.len() > 1 {
        return Err(CatalogError::InvalidEntity {
            entity: e.name.clone(),
            detail: format!("more than one field tagged {}: {:?}", tag, tagged),
        });
    }
    Ok(())
}

pub(crate) fn is_boolean_type(pg_type: &str) -> bool {
    pg_type.to_lowercase().starts_with("bool")
}

pub(crate) fn is_text_type(pg_type: &str) -> bool {
    let lower = pg_type.to_lowercase();
    lower == "text" || lower.starts_with("varchar") || lower.starts_with("character varying")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{CatalogConfig, EntityConfig, FieldConfig};

    fn field(name: &str, type_: &str) -> FieldConfig {
        FieldConfig {
            name: name.into(),
            type_: type_.into(),
            nullable: true,
            is_soft_deletable: false,
            is_status_toggle: false,
            is_workflow_status: false,
        }
    }

    fn entity(name: &str, table: &str, fields: Vec<FieldConfig>) -> EntityConfig {
        EntityConfig {
            name: name.into(),
            table: table.into(),
            schema: None,
            primary_key: "id".into(),
            fields,
            comment: None,
        }
    }

    #[test]
    fn accepts_a_plain_entity() {
        let config = CatalogConfig {
            entities: vec![entity("City", "cities", vec![field("name", "text")])],
        };
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn rejects_duplicate_names_case_insensitively() {
        let config = CatalogConfig {
            entities: vec![
                entity("City", "cities", vec![field("name", "text")]),
                entity("CITY", "city_records", vec![field("name", "text")]),
            ],
        };
        assert!(matches!(
            validate(&config),
            Err(CatalogError::DuplicateName(_))
        ));
    }

    #[test]
    fn accepts_entity_whose_name_equals_its_table() {
        let config = CatalogConfig {
            entities: vec![entity("couriers", "couriers", vec![field("name", "text")])],
        };
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn rejects_two_soft_delete_flags() {
        let mut a = field("deleted", "boolean");
        a.is_soft_deletable = true;
        let mut b = field("removed", "boolean");
        b.is_soft_deletable = true;
        let config = CatalogConfig {
            entities: vec![entity("City", "cities", vec![a, b])],
        };
        assert!(matches!(
            validate(&config),
            Err(CatalogError::InvalidEntity { .. })
        ));
    }

    #[test]
    fn rejects_conflated_toggle_and_workflow_field() {
        let mut f = field("status", "text");
        f.is_status_toggle = true;
        f.is_workflow_status = true;
        let config = CatalogConfig {
            entities: vec![entity("Lead", "leads", vec![f])],
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("distinct"), "{err}");
    }

    #[test]
    fn rejects_non_boolean_flag_field() {
        let mut f = field("deleted", "text");
        f.is_soft_deletable = true;
        let config = CatalogConfig {
            entities: vec![entity("City", "cities", vec![f])],
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_non_text_workflow_field() {
        let mut f = field("status", "integer");
        f.is_workflow_status = true;
        let config = CatalogConfig {
            entities: vec![entity("Lead", "leads", vec![f])],
        };
        assert!(validate(&config).is_err());
    }
}
