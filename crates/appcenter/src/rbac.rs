//! Permission resource types, as consumed by the host's access control.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::info;

pub const PLUGIN_NAME: &str = "appcenter";

/// Action that can be granted on a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub key: String,
    pub title_key: String,
}

/// Kind of resource permissions are granted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
    pub key: String,
    pub label_key: String,
    pub plugin_name: String,
    pub permissions: Vec<Permission>,
}

impl ResourceType {
    pub fn new(key: impl Into<String>, label_key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label_key: label_key.into(),
            plugin_name: PLUGIN_NAME.to_string(),
            permissions: Vec::new(),
        }
    }

    pub fn register_permission(&mut self, key: impl Into<String>, title_key: impl Into<String>) {
        self.permissions.push(Permission {
            key: key.into(),
            title_key: title_key.into(),
        });
    }

    pub fn permission(&self, key: &str) -> Option<&Permission> {
        self.permissions.iter().find(|permission| permission.key == key)
    }
}

/// Registry the host exposes for resource type declarations.
pub trait ResourceTypeRegistry: Send + Sync {
    fn register_resource_type(&self, resource_type: ResourceType);
}

/// Process-local registry keyed by resource type key. Re-registering replaces the entry.
#[derive(Debug, Default)]
pub struct InMemoryResourceTypeRegistry {
    types: RwLock<BTreeMap<String, ResourceType>>,
}

impl InMemoryResourceTypeRegistry {
    pub fn get(&self, key: &str) -> Option<ResourceType> {
        self.types
            .read()
            .ok()
            .and_then(|types| types.get(key).cloned())
    }

    pub fn keys(&self) -> Vec<String> {
        self.types
            .read()
            .map(|types| types.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl ResourceTypeRegistry for InMemoryResourceTypeRegistry {
    fn register_resource_type(&self, resource_type: ResourceType) {
        let mut types = match self.types.write() {
            Ok(types) => types,
            Err(poisoned) => poisoned.into_inner(),
        };
        info!(
            key = %resource_type.key,
            permissions = resource_type.permissions.len(),
            "resource type registered"
        );
        types.insert(resource_type.key.clone(), resource_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registering_twice_replaces_entry() {
        let registry = InMemoryResourceTypeRegistry::default();
        let mut first = ResourceType::new("DOC", "doc.label");
        first.register_permission("VIEW", "doc.view");
        registry.register_resource_type(first);

        let mut second = ResourceType::new("DOC", "doc.label");
        second.register_permission("EDIT", "doc.edit");
        registry.register_resource_type(second);

        let stored = registry.get("DOC").expect("registered");
        assert_eq!(registry.keys(), vec!["DOC".to_string()]);
        assert!(stored.permission("VIEW").is_none());
        assert_eq!(
            stored.permission("EDIT").map(|p| p.title_key.as_str()),
            Some("doc.edit")
        );
        assert_eq!(stored.plugin_name, PLUGIN_NAME);
    }
}
