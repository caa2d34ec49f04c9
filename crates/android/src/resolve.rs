//! Property resolution: [`Declaration`] to [`BuildConfiguration`]

use crate::extract::{BuildTypeDeclaration, Declaration, Value};
use crate::model::{
    AppVersion, BuildConfiguration, BuildType, JavaVersion, LanguageLevels, SdkLevels,
    DEBUG_SIGNING,
};
use droidconf_core::config::PropertyTable;
use droidconf_core::error::{Error, Result};
use std::collections::BTreeMap;

impl Declaration {
    /// Resolve property references and apply the build tool's defaults.
    ///
    /// `debug` and `release` build types always exist; `debug` signs with
    /// the debug identity unless it names another one or `null`. `targetSdk` defaults
    /// to `minSdk`, the application id to the namespace.
    pub fn resolve(&self, properties: &PropertyTable) -> Result<BuildConfiguration> {
        let resolver = Resolver { properties };

        let namespace = self
            .namespace
            .as_ref()
            .map(|v| resolver.string("namespace", v))
            .transpose()?;

        let application_id = match (&self.application_id, &namespace) {
            (Some(value), _) => resolver.string("applicationId", value)?,
            (None, Some(namespace)) => namespace.clone(),
            (None, None) => {
                return Err(Error::validation(
                    "applicationId",
                    "Neither applicationId nor namespace is declared",
                ))
            }
        };

        let compile = resolver.required_int("sdk.compile", self.compile_sdk.as_ref())?;
        let min = resolver.required_int("sdk.min", self.min_sdk.as_ref())?;
        let target = match &self.target_sdk {
            Some(value) => resolver.int("sdk.target", value)?,
            None => min,
        };

        let fallback = self.toolchain.unwrap_or(JavaVersion::Java8);
        let language_level = LanguageLevels {
            source_compatibility: self.source_compatibility.unwrap_or(fallback),
            target_compatibility: self.target_compatibility.unwrap_or(fallback),
            jvm_target: self.jvm_target.unwrap_or(fallback),
        };

        let defaults = AppVersion::default();
        let version = AppVersion {
            code: match &self.version_code {
                Some(value) => resolver.int("version.code", value)?,
                None => defaults.code,
            },
            name: match &self.version_name {
                Some(value) => resolver.string("version.name", value)?,
                None => defaults.name,
            },
        };

        let ndk_version = self
            .ndk_version
            .as_ref()
            .map(|v| resolver.string("ndkVersion", v))
            .transpose()?;

        let config = BuildConfiguration {
            namespace,
            application_id,
            plugins: self.plugins.clone(),
            ndk_version,
            multi_dex: self.multi_dex.unwrap_or(false),
            flutter_source: self.flutter_source.clone(),
            signing_configs: self.signing_configs.clone(),
            sdk: SdkLevels::new(min, target, compile),
            language_level,
            version,
            build_features: self.build_features.clone(),
            build_types: self.resolved_build_types(),
            dependencies: self.dependencies.clone(),
        };

        tracing::debug!(
            application_id = %config.application_id,
            build_types = config.build_types.len(),
            dependencies = config.dependencies.len(),
            "Declaration resolved"
        );
        Ok(config)
    }

    fn resolved_build_types(&self) -> BTreeMap<String, BuildType> {
        let mut declared = self.build_types.clone();
        for implicit in ["debug", "release"] {
            declared.entry(implicit.to_string()).or_default();
        }

        declared
            .into_iter()
            .map(|(name, decl)| {
                let build_type = resolve_build_type(&name, decl);
                (name, build_type)
            })
            .collect()
    }
}

fn resolve_build_type(name: &str, decl: BuildTypeDeclaration) -> BuildType {
    let signing_ref = match decl.signing_ref {
        Some(signing) => signing,
        None if name == "debug" => Some(DEBUG_SIGNING.to_string()),
        None => None,
    };

    BuildType {
        minify: decl.minify.unwrap_or(false),
        shrink: decl.shrink.unwrap_or(false),
        proguard_rules: decl.proguard_rules,
        signing_ref,
    }
}

struct Resolver<'a> {
    properties: &'a PropertyTable,
}

impl Resolver<'_> {
    fn lookup(&self, field: &str, property: &str) -> Result<&str> {
        let value = self.properties.get(property).ok_or_else(|| {
            Error::not_found("property", property)
                .with_context(format!("field `{field}`"))
                .with_suggestion(format!(
                    "Define \"{property}\" under [properties] in .droidconf.toml"
                ))
        })?;
        tracing::debug!(%field, %property, %value, "Property resolved");
        Ok(value)
    }

    fn string(&self, field: &str, value: &Value<String>) -> Result<String> {
        match value {
            Value::Literal(literal) => Ok(literal.clone()),
            Value::Property(property) => self.lookup(field, property).map(str::to_string),
            Value::OutOfRange(raw) => Err(out_of_range(field, *raw)),
        }
    }

    fn int(&self, field: &str, value: &Value<u32>) -> Result<u32> {
        match value {
            Value::Literal(literal) => Ok(*literal),
            Value::Property(property) => {
                let raw = self.lookup(field, property)?;
                raw.trim().parse().map_err(|_| {
                    Error::validation(
                        field,
                        format!("Property {property} = {raw:?} is not a non-negative integer"),
                    )
                })
            }
            Value::OutOfRange(raw) => Err(out_of_range(field, *raw)),
        }
    }

    fn required_int(&self, field: &str, value: Option<&Value<u32>>) -> Result<u32> {
        match value {
            Some(value) => self.int(field, value),
            None => Err(Error::validation(field, format!("{field} is not declared"))),
        }
    }
}

fn out_of_range(field: &str, raw: i64) -> Error {
    Error::validation(field, format!("{raw} is out of range for {field}"))
}
