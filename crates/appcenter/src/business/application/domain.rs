use std::collections::BTreeSet;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::business::environment::Environment;

/// Identifier of a persisted application. `0` marks an application that has not been inserted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ApplicationId(pub i64);

impl ApplicationId {
    pub const UNASSIGNED: ApplicationId = ApplicationId(0);

    pub fn is_assigned(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to the organization manager owning an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationManagerId(pub i64);

/// Raw file content, stored as a blob and exchanged as base64 over JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhysicalFile {
    value: Vec<u8>,
}

impl PhysicalFile {
    pub fn new(value: Vec<u8>) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl Serialize for PhysicalFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.value))
    }
}

impl<'de> Deserialize<'de> for PhysicalFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(PhysicalFile::new)
            .map_err(serde::de::Error::custom)
    }
}

/// Application managed by the application center.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub id: ApplicationId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub organization_manager: Option<OrganizationManagerId>,
    /// Opaque JSON document; its schema belongs to the feature modules writing it.
    #[serde(default)]
    pub application_data: Option<String>,
    pub code: String,
    #[serde(default)]
    pub logo: PhysicalFile,
    #[serde(default)]
    pub front_url: String,
    #[serde(default)]
    pub back_url: String,
    #[serde(default)]
    pub environments: BTreeSet<Environment>,
}

impl Application {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_environments(mut self, environments: impl IntoIterator<Item = Environment>) -> Self {
        self.environments = environments.into_iter().collect();
        self
    }
}

/// Search criteria for application listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationFilter {
    #[serde(default)]
    pub search: Option<String>,
}

impl ApplicationFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
        }
    }

    /// Search term as typed; blank input means no filter.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .filter(|term| !term.trim().is_empty())
    }

    pub fn has_search(&self) -> bool {
        self.search_term().is_some()
    }
}
