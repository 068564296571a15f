//! Process-wide registry of entity descriptors. Built once at startup,
//! immutable afterwards; shared read-only across all in-flight requests.

use crate::catalog::resolved::{Capability, EntityDescriptor};
use crate::error::CatalogError;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Catalog {
    entities: Vec<EntityDescriptor>,
    /// Lowercased canonical and table names, both pointing at the entity.
    by_key: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: re-registering an identical descriptor is a no-op.
    /// A different schema under an already-registered name is a fatal
    /// configuration error.
    pub fn register(&mut self, descriptor: EntityDescriptor) -> Result<(), CatalogError> {
        let canonical_key = descriptor.canonical_name.to_lowercase();
        let table_key = descriptor.table_name.to_lowercase();
        let existing = self
            .by_key
            .get(&canonical_key)
            .or_else(|| self.by_key.get(&table_key))
            .map(|&idx| &self.entities[idx]);
        if let Some(existing) = existing {
            if *existing == descriptor {
                return Ok(());
            }
            return Err(CatalogError::ConflictingRegistration {
                name: existing.canonical_name.clone(),
                detail: "already registered with a different schema".into(),
            });
        }
        let idx = self.entities.len();
        self.entities.push(descriptor);
        self.by_key.insert(canonical_key, idx);
        self.by_key.insert(table_key, idx);
        Ok(())
    }

    /// Case-insensitive match against the canonical or the storage-facing
    /// name. The returned descriptor keeps its stored canonical casing.
    pub fn lookup(&self, name: &str) -> Option<&EntityDescriptor> {
        self.by_key
            .get(&name.to_lowercase())
            .map(|&idx| &self.entities[idx])
    }

    pub fn has_capability(&self, descriptor: &EntityDescriptor, capability: Capability) -> bool {
        descriptor.has_capability(capability)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
