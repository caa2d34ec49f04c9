//! Build configuration record
//!
//! [`BuildConfiguration`] is the resolved, immutable view of an Android
//! application module's build declaration. It is built once (from a Kotlin
//! DSL file, TOML or JSON) and passed by reference to consumers.

use droidconf_core::error::{Error, ErrorCode, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Name of the signing identity the build tool always provides
pub const DEBUG_SIGNING: &str = "debug";

/// Resolved build configuration of an application module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    pub application_id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ndk_version: Option<String>,

    #[serde(default)]
    pub multi_dex: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flutter_source: Option<String>,

    /// Declared signing identities; `debug` is implicitly available
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signing_configs: Vec<String>,

    pub sdk: SdkLevels,

    #[serde(default)]
    pub language_level: LanguageLevels,

    #[serde(default)]
    pub version: AppVersion,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub build_features: BTreeMap<String, bool>,

    #[serde(default)]
    pub build_types: BTreeMap<String, BuildType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
}

impl BuildConfiguration {
    /// Minimal configuration with default language levels, no build types
    /// and no dependencies
    pub fn new(application_id: impl Into<String>, sdk: SdkLevels) -> Self {
        Self {
            namespace: None,
            application_id: application_id.into(),
            plugins: Vec::new(),
            ndk_version: None,
            multi_dex: false,
            flutter_source: None,
            signing_configs: Vec::new(),
            sdk,
            language_level: LanguageLevels::default(),
            version: AppVersion::default(),
            build_features: BTreeMap::new(),
            build_types: BTreeMap::new(),
            dependencies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_language_level(mut self, level: JavaVersion) -> Self {
        self.language_level = LanguageLevels::uniform(level);
        self
    }

    #[must_use]
    pub fn with_build_type(mut self, name: impl Into<String>, build_type: BuildType) -> Self {
        self.build_types.insert(name.into(), build_type);
        self
    }

    #[must_use]
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Whether a signing identity can be referenced by build types
    pub fn has_signing_config(&self, name: &str) -> bool {
        name == DEBUG_SIGNING || self.signing_configs.iter().any(|s| s == name)
    }
}

/// Platform API levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkLevels {
    pub min: u32,
    pub target: u32,
    pub compile: u32,
}

impl SdkLevels {
    pub fn new(min: u32, target: u32, compile: u32) -> Self {
        Self {
            min,
            target,
            compile,
        }
    }
}

/// Java/Kotlin language level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JavaVersion {
    #[serde(rename = "JAVA_1_8")]
    Java8,
    #[serde(rename = "JAVA_11")]
    Java11,
    #[serde(rename = "JAVA_17")]
    Java17,
    #[serde(rename = "JAVA_21")]
    Java21,
}

impl JavaVersion {
    pub const ALL: [JavaVersion; 4] = [
        JavaVersion::Java8,
        JavaVersion::Java11,
        JavaVersion::Java17,
        JavaVersion::Java21,
    ];

    /// Runtime major version
    pub fn major(self) -> u32 {
        match self {
            JavaVersion::Java8 => 8,
            JavaVersion::Java11 => 11,
            JavaVersion::Java17 => 17,
            JavaVersion::Java21 => 21,
        }
    }

    pub fn from_major(major: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.major() == major)
    }

    /// `JavaVersion.VERSION_*` constant name
    pub fn gradle_constant(self) -> &'static str {
        match self {
            JavaVersion::Java8 => "VERSION_1_8",
            JavaVersion::Java11 => "VERSION_11",
            JavaVersion::Java17 => "VERSION_17",
            JavaVersion::Java21 => "VERSION_21",
        }
    }

    /// Value accepted by Kotlin's `jvmTarget`
    pub fn jvm_target(self) -> &'static str {
        match self {
            JavaVersion::Java8 => "1.8",
            JavaVersion::Java11 => "11",
            JavaVersion::Java17 => "17",
            JavaVersion::Java21 => "21",
        }
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.jvm_target())
    }
}

impl FromStr for JavaVersion {
    type Err = Error;

    /// Accepts `17`, `1.8`, `VERSION_17`, `VERSION_1_8`, `JVM_17` and `JAVA_17`
    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .trim()
            .trim_start_matches("VERSION_")
            .trim_start_matches("JVM_")
            .trim_start_matches("JAVA_")
            .replace('_', ".");
        let major = digits.strip_prefix("1.").unwrap_or(&digits);

        major
            .parse::<u32>()
            .ok()
            .and_then(Self::from_major)
            .ok_or_else(|| {
                Error::new(
                    ErrorCode::InvalidFormat,
                    format!("Unsupported Java version: {s}"),
                )
                .with_suggestion("Use one of 1.8, 11, 17 or 21")
            })
    }
}

/// Language levels of the Java and Kotlin compilers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageLevels {
    pub source_compatibility: JavaVersion,
    pub target_compatibility: JavaVersion,
    pub jvm_target: JavaVersion,
}

impl LanguageLevels {
    pub fn uniform(level: JavaVersion) -> Self {
        Self {
            source_compatibility: level,
            target_compatibility: level,
            jvm_target: level,
        }
    }
}

impl Default for LanguageLevels {
    fn default() -> Self {
        Self::uniform(JavaVersion::Java8)
    }
}

/// Application version shown to users and stores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppVersion {
    pub code: u32,
    pub name: String,
}

impl Default for AppVersion {
    fn default() -> Self {
        Self {
            code: 1,
            name: "1.0".to_string(),
        }
    }
}

/// Optimization and signing settings of one build variant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildType {
    #[serde(default)]
    pub minify: bool,

    #[serde(default)]
    pub shrink: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proguard_rules: Vec<ProguardFile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_ref: Option<String>,
}

impl BuildType {
    /// Release-style type: minified, resources shrunk
    pub fn optimized() -> Self {
        Self {
            minify: true,
            shrink: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn signed_with(mut self, signing: impl Into<String>) -> Self {
        self.signing_ref = Some(signing.into());
        self
    }

    #[must_use]
    pub fn with_proguard(mut self, file: ProguardFile) -> Self {
        self.proguard_rules.push(file);
        self
    }
}

/// A shrinker rules file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProguardFile {
    /// File shipped with the build tool (`getDefaultProguardFile(...)`)
    Default(String),
    /// Path relative to the module
    Project(String),
}

impl ProguardFile {
    const DEFAULT_PREFIX: &'static str = "default:";

    pub fn name(&self) -> &str {
        match self {
            ProguardFile::Default(name) | ProguardFile::Project(name) => name,
        }
    }
}

impl fmt::Display for ProguardFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProguardFile::Default(name) => write!(f, "{}{name}", Self::DEFAULT_PREFIX),
            ProguardFile::Project(path) => f.write_str(path),
        }
    }
}

impl From<ProguardFile> for String {
    fn from(file: ProguardFile) -> Self {
        file.to_string()
    }
}

impl TryFrom<String> for ProguardFile {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        let file = match value.strip_prefix(ProguardFile::DEFAULT_PREFIX) {
            Some(name) => ProguardFile::Default(name.to_string()),
            None => ProguardFile::Project(value),
        };
        if file.name().trim().is_empty() {
            return Err(Error::new(
                ErrorCode::InvalidFormat,
                "Proguard file reference is empty",
            ));
        }
        Ok(file)
    }
}

/// An external library coordinate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(default = "default_configuration")]
    pub configuration: String,
    pub group: String,
    pub artifact: String,
    pub version: String,
}

fn default_configuration() -> String {
    "implementation".to_string()
}

impl Dependency {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            configuration: default_configuration(),
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// Parse `group:artifact:version` notation
    pub fn parse_notation(configuration: &str, notation: &str) -> Result<Self> {
        let parts: Vec<&str> = notation.split(':').collect();
        let [group, artifact, version] = parts.as_slice() else {
            return Err(Error::new(
                ErrorCode::InvalidFormat,
                format!("Invalid dependency notation: {notation}"),
            )
            .with_suggestion("Use group:artifact:version"));
        };

        Ok(Self {
            configuration: configuration.to_string(),
            group: (*group).to_string(),
            artifact: (*artifact).to_string(),
            version: (*version).to_string(),
        })
    }

    /// `group:artifact`
    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }

    /// `group:artifact:version`
    pub fn notation(&self) -> String {
        format!("{}:{}:{}", self.group, self.artifact, self.version)
    }
}
