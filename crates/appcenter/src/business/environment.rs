use std::fmt;

use serde::{Deserialize, Serialize};

/// Deployment target an application can be associated with.
///
/// The code doubles as the key stored in `appcenter_application_environment`, so existing
/// codes must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Environment {
    #[serde(rename = "dev")]
    Development,
    #[serde(rename = "int")]
    Integration,
    #[serde(rename = "qualif")]
    Qualification,
    #[serde(rename = "preprod")]
    Preproduction,
    #[serde(rename = "prod")]
    Production,
}

impl Environment {
    pub const ALL: [Environment; 5] = [
        Environment::Development,
        Environment::Integration,
        Environment::Qualification,
        Environment::Preproduction,
        Environment::Production,
    ];

    /// Stable code (also used as the display prefix).
    pub const fn prefix(self) -> &'static str {
        match self {
            Environment::Development => "dev",
            Environment::Integration => "int",
            Environment::Qualification => "qualif",
            Environment::Preproduction => "preprod",
            Environment::Production => "prod",
        }
    }

    /// I18n key of the human readable label.
    pub const fn label_key(self) -> &'static str {
        match self {
            Environment::Development => "appcenter.environment.dev",
            Environment::Integration => "appcenter.environment.int",
            Environment::Qualification => "appcenter.environment.qualif",
            Environment::Preproduction => "appcenter.environment.preprod",
            Environment::Production => "appcenter.environment.prod",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|environment| environment.prefix() == code)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}
