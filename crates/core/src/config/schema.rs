//! Tool settings schema
//!
//! Settings live in `.droidconf.toml` and control how build declarations
//! are resolved and which advisory rules apply.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root settings schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    /// Property overrides, merged over the Flutter defaults
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,

    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub scan: ScanConfig,
}

impl ConfigSchema {
    /// Property table with the Flutter defaults and the overrides applied
    pub fn property_table(&self) -> PropertyTable {
        let mut table = PropertyTable::flutter_defaults();
        for (name, value) in &self.properties {
            table.insert(name.clone(), value.to_string());
        }
        table
    }
}

/// A property value as written in TOML (`23` or `"23"`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PropertyValue {
    Integer(i64),
    Text(String),
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Integer(value) => write!(f, "{value}"),
            PropertyValue::Text(value) => f.write_str(value),
        }
    }
}

/// Externally-provided values referenced from build declarations,
/// such as `flutter.minSdkVersion`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyTable(BTreeMap<String, String>);

impl PropertyTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults supplied by the Flutter Gradle plugin
    pub fn flutter_defaults() -> Self {
        let mut table = Self::new();
        table.insert("flutter.compileSdkVersion", "35");
        table.insert("flutter.minSdkVersion", "21");
        table.insert("flutter.targetSdkVersion", "35");
        table.insert("flutter.ndkVersion", "26.3.11579264");
        table.insert("flutter.versionCode", "1");
        table.insert("flutter.versionName", "1.0.0");
        table
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Advisory rule toggles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RulesConfig {
    /// Warn when the application id lives under `com.example`
    #[serde(default = "default_true")]
    pub warn_example_application_id: bool,

    /// Warn when the release build type is signed with the debug identity
    #[serde(default = "default_true")]
    pub warn_debug_signed_release: bool,

    /// Treat a missing `ndkVersion` as an error
    #[serde(default)]
    pub require_ndk_version: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            warn_example_application_id: true,
            warn_debug_signed_release: true,
            require_ndk_version: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Settings for `droidconf scan`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanConfig {
    /// Build file names to look for
    #[serde(default = "default_file_names")]
    pub file_names: Vec<String>,

    /// Glob patterns to skip
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            file_names: default_file_names(),
            exclude: default_exclude(),
        }
    }
}

fn default_file_names() -> Vec<String> {
    vec!["build.gradle.kts".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec!["**/build/**".to_string(), "**/.gradle/**".to_string()]
}
