// vscdb-scrub - Target profile configuration
//
// A profile names everything that identifies one extension's data inside the
// store: the literal credential key, key markers, JSON field allowlists and
// the history markers. The built-in default targets the Blackbox extension;
// other profiles are loaded from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read profile: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse profile: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid profile: {0}")]
    Invalid(String),
}

/// Immutable description of the extension whose credentials are targeted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetProfile {
    /// Human-readable name used in reports.
    pub name: String,
    /// Exact key holding the extension's main credential blob.
    pub main_key: String,
    /// Case-insensitive substrings that mark a key as the extension's.
    pub key_markers: Vec<String>,
    /// Top-level JSON fields whose presence marks a value as credential data.
    pub detection_fields: Vec<String>,
    /// Fields copied into the preview, in this order.
    pub preview_fields: Vec<String>,
    /// Key of the "recently opened" history document.
    pub history_key: String,
    /// Case-insensitive substrings matched against history `folderUri`s.
    pub history_markers: Vec<String>,
    /// Allow keys that only match on value contents to be removed.
    pub allow_value_only_match: bool,
}

impl Default for TargetProfile {
    fn default() -> Self {
        Self {
            name: "Blackbox".to_string(),
            main_key: "Blackboxapp.blackboxagent".to_string(),
            key_markers: strings(&[
                "blackboxapp.blackboxagent",
                "blackboxai-dev.",
                "workbench.view.extension.blackboxai-dev",
            ]),
            detection_fields: strings(&["userId", "blackbox_userId", "apiProvider"]),
            preview_fields: strings(&["userId", "blackbox_userId", "apiProvider", "installed"]),
            history_key: "history.recentlyOpenedPathsList".to_string(),
            history_markers: strings(&["blackbox", "blackboxai", "blackboxapp"]),
            allow_value_only_match: false,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl TargetProfile {
    /// Parse a profile from TOML text. Omitted fields keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let profile: Self = toml::from_str(text)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let profile = Self::from_toml(&text)?;
        tracing::info!(profile = %profile.name, path = %path.display(), "Profile loaded");
        Ok(profile)
    }

    /// Load from `path` if given, otherwise use the built-in profile.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // An empty marker would match every key.
        if self.key_markers.iter().any(|m| m.trim().is_empty())
            || self.history_markers.iter().any(|m| m.trim().is_empty())
        {
            return Err(ConfigError::Invalid("markers must not be empty strings".to_string()));
        }
        if self.main_key.is_empty() && self.key_markers.is_empty() {
            return Err(ConfigError::Invalid(
                "profile needs a main_key or at least one key marker".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
