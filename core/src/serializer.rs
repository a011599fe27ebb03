use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use twox_hash::XxHash64;

/// Version of the script language carried by saved packages.
pub const SCRIPT_LANGUAGE_VERSION: &str = "1.0";

const DEFAULT_SCRIPT_TITLE: &str = "My script";

/// Failure importing or exporting a script package.
#[derive(Debug)]
pub enum PackageError {
    /// The content is not a mapping carrying both `title` and `script`.
    InvalidPackage(String),
    /// The content could not be decoded or encoded at all.
    Format(String),
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPackage(message) => write!(f, "Invalid script package: {message}"),
            Self::Format(message) => write!(f, "Script package format error: {message}"),
        }
    }
}

impl std::error::Error for PackageError {}

/// A saved script with its descriptive metadata, importable and exportable
/// as a YAML package or plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptPackage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub script_language_version: String,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub license: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_updated: String,
}

/// Consistently formatted UTC timestamp for `last_updated`.
pub fn make_last_updated() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn derive_id(title: &str, script: &str, stamp: &str) -> String {
    let mut hasher = XxHash64::default();
    title.hash(&mut hasher);
    script.hash(&mut hasher);
    stamp.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

impl ScriptPackage {
    pub fn new(title: impl Into<String>, script: impl Into<String>) -> Self {
        let title = title.into();
        let title = if title.is_empty() {
            DEFAULT_SCRIPT_TITLE.to_string()
        } else {
            title
        };
        let script = script.into();
        let last_updated = make_last_updated();
        let id = derive_id(&title, &script, &last_updated);
        Self {
            title,
            script_language_version: SCRIPT_LANGUAGE_VERSION.to_string(),
            script,
            id,
            description: String::new(),
            author: String::new(),
            license: String::new(),
            version: String::new(),
            last_updated,
        }
    }

    /// Refresh the `last_updated` stamp after an edit.
    pub fn update_last_updated(&mut self) {
        self.last_updated = make_last_updated();
    }

    /// A copy with a fresh id, a "(Copy)" title and the current language
    /// version.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.title = format!("{} (Copy)", self.title);
        copy.script_language_version = SCRIPT_LANGUAGE_VERSION.to_string();
        copy.update_last_updated();
        copy.id = derive_id(&copy.title, &copy.script, &copy.last_updated);
        copy
    }

    fn validate(&mut self) -> Result<(), PackageError> {
        if self.title.trim().is_empty() || self.script.trim().is_empty() {
            return Err(PackageError::InvalidPackage(
                "both 'title' and 'script' are required".to_string(),
            ));
        }
        if self.script_language_version.is_empty() {
            self.script_language_version = SCRIPT_LANGUAGE_VERSION.to_string();
        }
        if self.last_updated.is_empty() {
            self.last_updated = make_last_updated();
        }
        if self.id.is_empty() {
            self.id = derive_id(&self.title, &self.script, &self.last_updated);
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, PackageError> {
        serde_yaml::to_string(self).map_err(|err| PackageError::Format(err.to_string()))
    }

    pub fn from_yaml(content: &str) -> Result<Self, PackageError> {
        // Decode through a generic value first so a scalar or sequence
        // document reports "not a mapping" instead of a field error.
        let value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|err| PackageError::Format(err.to_string()))?;
        if !value.is_mapping() {
            return Err(PackageError::InvalidPackage(
                "content is not a mapping".to_string(),
            ));
        }
        let mut package: Self =
            serde_yaml::from_value(value).map_err(|err| PackageError::Format(err.to_string()))?;
        package.validate()?;
        Ok(package)
    }

    pub fn to_json(&self) -> Result<String, PackageError> {
        serde_json::to_string_pretty(self).map_err(|err| PackageError::Format(err.to_string()))
    }

    pub fn from_json(content: &str) -> Result<Self, PackageError> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|err| PackageError::Format(err.to_string()))?;
        if !value.is_object() {
            return Err(PackageError::InvalidPackage(
                "content is not a mapping".to_string(),
            ));
        }
        let mut package: Self =
            serde_json::from_value(value).map_err(|err| PackageError::Format(err.to_string()))?;
        package.validate()?;
        Ok(package)
    }
}
