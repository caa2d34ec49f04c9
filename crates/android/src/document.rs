//! Build configuration documents on disk
//!
//! A configuration is read from a Kotlin DSL build file (resolved against a
//! property table) or from its TOML/JSON serialization.

use crate::dsl;
use crate::extract::{Declaration, Unrecognized};
use crate::model::BuildConfiguration;
use crate::render::render_kts;
use droidconf_core::config::PropertyTable;
use droidconf_core::error::{Error, ErrorCode, Result, ResultExt};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Kts,
    Toml,
    Json,
}

impl DocumentFormat {
    /// Detect the format from a file name
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if name.ends_with(".kts") {
            Ok(Self::Kts)
        } else if name.ends_with(".toml") {
            Ok(Self::Toml)
        } else if name.ends_with(".json") {
            Ok(Self::Json)
        } else {
            Err(Error::unsupported_format(path))
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kts => "kts",
            Self::Toml => "toml",
            Self::Json => "json",
        })
    }
}

impl FromStr for DocumentFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "kts" | "kotlin" | "gradle" => Ok(Self::Kts),
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            other => Err(Error::new(
                ErrorCode::UnsupportedFormat,
                format!("Unknown format: {other}"),
            )
            .with_suggestion("Use kts, toml or json")),
        }
    }
}

/// A configuration together with what the reader skipped
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub configuration: BuildConfiguration,
    /// Statements of a Kotlin DSL file that carry no configuration data
    pub unrecognized: Vec<Unrecognized>,
}

/// Read a configuration document; the format follows the file name
pub fn load(path: &Path, properties: &PropertyTable) -> Result<LoadedDocument> {
    let format = DocumentFormat::from_path(path)?;
    if !path.is_file() {
        return Err(Error::file_not_found(path));
    }

    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read {}", path.display()))?;

    let document = from_str(&content, format, properties)?;
    tracing::info!(
        path = %path.display(),
        %format,
        application_id = %document.configuration.application_id,
        skipped = document.unrecognized.len(),
        "Configuration loaded"
    );
    Ok(document)
}

/// Read a configuration from text in the given format
pub fn from_str(
    content: &str,
    format: DocumentFormat,
    properties: &PropertyTable,
) -> Result<LoadedDocument> {
    match format {
        DocumentFormat::Kts => {
            let declaration = Declaration::from_script(&dsl::parse(content)?);
            let configuration = declaration.resolve(properties)?;
            Ok(LoadedDocument {
                configuration,
                unrecognized: declaration.unrecognized,
            })
        }
        DocumentFormat::Toml => Ok(LoadedDocument {
            configuration: toml::from_str(content)?,
            unrecognized: Vec::new(),
        }),
        DocumentFormat::Json => Ok(LoadedDocument {
            configuration: serde_json::from_str(content)?,
            unrecognized: Vec::new(),
        }),
    }
}

/// Serialize a configuration
pub fn to_string(config: &BuildConfiguration, format: DocumentFormat) -> Result<String> {
    match format {
        DocumentFormat::Kts => Ok(render_kts(config)),
        DocumentFormat::Toml => Ok(toml::to_string_pretty(config)?),
        DocumentFormat::Json => {
            let mut json = serde_json::to_string_pretty(config)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Write a configuration; the format follows the file name
pub fn save(config: &BuildConfiguration, path: &Path) -> Result<()> {
    let format = DocumentFormat::from_path(path)?;
    std::fs::write(path, to_string(config, format)?)
        .map_err(Error::from)
        .context(format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), %format, "Configuration written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BuildType, Dependency, JavaVersion, ProguardFile, SdkLevels,
    };
    use tempfile::TempDir;

    fn sample() -> BuildConfiguration {
        let mut config = BuildConfiguration::new("com.acme.app", SdkLevels::new(21, 34, 34))
            .with_language_level(JavaVersion::Java17)
            .with_build_type(
                "release",
                BuildType::optimized()
                    .with_proguard(ProguardFile::Default("proguard-android-optimize.txt".into()))
                    .signed_with("upload"),
            )
            .with_build_type("debug", BuildType::default().signed_with("debug"))
            .with_dependency(Dependency::new("androidx.core", "core-ktx", "1.12.0"));
        config.signing_configs = vec!["upload".into()];
        config.build_features.insert("viewBinding".into(), true);
        config
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("app/build.gradle.kts")).unwrap(),
            DocumentFormat::Kts
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("app.TOML")).unwrap(),
            DocumentFormat::Toml
        );
        let err = DocumentFormat::from_path(Path::new("build.gradle")).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFormat);
        assert_eq!("json".parse::<DocumentFormat>().unwrap(), DocumentFormat::Json);
        assert!("yaml".parse::<DocumentFormat>().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = sample();
        let text = to_string(&config, DocumentFormat::Toml).unwrap();
        assert!(text.contains("applicationId = \"com.acme.app\""));
        assert!(text.contains("\"default:proguard-android-optimize.txt\""));
        let loaded = from_str(&text, DocumentFormat::Toml, &PropertyTable::new()).unwrap();
        assert_eq!(loaded.configuration, config);
    }

    #[test]
    fn test_json_round_trip() {
        let config = sample();
        let text = to_string(&config, DocumentFormat::Json).unwrap();
        assert!(text.contains("\"sourceCompatibility\": \"JAVA_17\""));
        let loaded = from_str(&text, DocumentFormat::Json, &PropertyTable::new()).unwrap();
        assert_eq!(loaded.configuration, config);
    }

    #[test]
    fn test_json_defaults() {
        let loaded = from_str(
            r#"{"applicationId":"com.acme.app","sdk":{"min":21,"target":34,"compile":34}}"#,
            DocumentFormat::Json,
            &PropertyTable::new(),
        )
        .unwrap();
        let config = loaded.configuration;
        assert_eq!(config.language_level.jvm_target, JavaVersion::Java8);
        assert_eq!(config.version.code, 1);
        assert!(config.build_types.is_empty());
    }

    #[test]
    fn test_malformed_json() {
        let err = from_str("{", DocumentFormat::Json, &PropertyTable::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let config = sample();

        for name in ["app.toml", "app.json", "build.gradle.kts"] {
            let path = dir.path().join(name);
            save(&config, &path).unwrap();
            let loaded = load(&path, &PropertyTable::new()).unwrap();
            assert_eq!(loaded.configuration, config, "{name}");
            assert!(loaded.unrecognized.is_empty());
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/app.toml"), &PropertyTable::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileNotFound);
    }

    #[test]
    fn test_kts_reports_skipped_statements() {
        let source = r#"
            android {
                namespace = "com.acme.app"
                compileSdk = 34
                defaultConfig { minSdk = 21 }
                lint { abortOnError = false }
            }
        "#;
        let loaded = from_str(source, DocumentFormat::Kts, &PropertyTable::new()).unwrap();
        assert_eq!(loaded.unrecognized.len(), 1);
        assert_eq!(loaded.unrecognized[0].path, "android.lint");
    }
}
