//! Invariant checks and build type lookup

use crate::model::{BuildConfiguration, BuildType, DEBUG_SIGNING};
use droidconf_core::config::RulesConfig;
use droidconf_core::error::{Error, ErrorCode, Result};
use droidconf_core::validation::{ValidationError, ValidationResult, Validator};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Reverse-domain identifier: two or more segments, each starting with a letter
static APPLICATION_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap());

static NDK_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+){0,3}$").unwrap());

const APPLICATION_ID_FORMAT: &str = "a reverse-domain identifier such as com.company.app";

impl BuildConfiguration {
    /// Run every rule with the default rule settings
    pub fn check(&self) -> ValidationResult {
        self.check_with(&RulesConfig::default())
    }

    /// Run every rule, collecting errors and warnings
    pub fn check_with(&self, rules: &RulesConfig) -> ValidationResult {
        let mut validator = Validator::new()
            .required("applicationId", &self.application_id)
            .pattern(
                "applicationId",
                &self.application_id,
                &APPLICATION_ID,
                APPLICATION_ID_FORMAT,
            )
            .warn_if(
                "applicationId",
                rules.warn_example_application_id
                    && (self.application_id == "com.example"
                        || self.application_id.starts_with("com.example.")),
                "Application ids under com.example are rejected by app stores",
            );

        if let Some(namespace) = &self.namespace {
            validator =
                validator.pattern("namespace", namespace, &APPLICATION_ID, APPLICATION_ID_FORMAT);
        }

        validator = validator
            .at_least("sdk.min", self.sdk.min, 1)
            .ordered("sdk.min", self.sdk.min, "sdk.target", self.sdk.target)
            .ordered("sdk.target", self.sdk.target, "sdk.compile", self.sdk.compile);

        validator = match &self.ndk_version {
            Some(ndk) => validator.pattern("ndkVersion", ndk, &NDK_VERSION, "a dotted numeric version"),
            None if rules.require_ndk_version => validator.violation(
                ValidationError::new("ndkVersion", "REQUIRED", "ndkVersion must be declared")
                    .expected("a dotted numeric version"),
            ),
            None => validator,
        };

        let levels = &self.language_level;
        validator = validator
            .all_equal(
                "languageLevel",
                &[
                    ("sourceCompatibility", levels.source_compatibility),
                    ("targetCompatibility", levels.target_compatibility),
                    ("jvmTarget", levels.jvm_target),
                ],
            )
            .at_least("version.code", self.version.code, 1)
            .required("version.name", &self.version.name);

        for (name, build_type) in &self.build_types {
            validator = self.check_build_type(validator, name, build_type, rules);
        }

        self.check_dependencies(validator).validate()
    }

    fn check_build_type(
        &self,
        mut validator: Validator,
        name: &str,
        build_type: &BuildType,
        rules: &RulesConfig,
    ) -> Validator {
        let field = format!("buildTypes.{name}");

        if build_type.shrink && !build_type.minify {
            validator = validator.violation(
                ValidationError::new(
                    format!("{field}.shrink"),
                    "SHRINK_WITHOUT_MINIFY",
                    "Resource shrinking requires minify to be enabled",
                )
                .expected("minify = true"),
            );
        }

        validator = validator.warn_if(
            &format!("{field}.proguardRules"),
            !build_type.minify && !build_type.proguard_rules.is_empty(),
            "Proguard rules have no effect while minify is disabled",
        );

        if let Some(signing) = effective_signing(name, build_type) {
            if !self.has_signing_config(signing) {
                validator = validator.violation(
                    ValidationError::new(
                        format!("{field}.signingRef"),
                        "UNKNOWN_SIGNING_CONFIG",
                        format!("Signing config `{signing}` is not declared"),
                    )
                    .with_kind(ErrorCode::NotFound)
                    .expected(format!("one of: {}", self.signing_names().join(", ")))
                    .actual(signing),
                );
            }

            validator = validator.warn_if(
                &format!("{field}.signingRef"),
                rules.warn_debug_signed_release && name == "release" && signing == DEBUG_SIGNING,
                "Release build is signed with the debug identity",
            );
        }

        validator
    }

    fn check_dependencies(&self, mut validator: Validator) -> Validator {
        let mut versions: BTreeMap<String, Vec<&str>> = BTreeMap::new();

        for (index, dep) in self.dependencies.iter().enumerate() {
            let field = format!("dependencies[{index}]");
            validator = validator
                .required(&format!("{field}.group"), &dep.group)
                .required(&format!("{field}.artifact"), &dep.artifact)
                .required(&format!("{field}.version"), &dep.version);

            versions.entry(dep.coordinate()).or_default().push(&dep.version);
        }

        for (coordinate, declared) in versions {
            let mut distinct = declared.clone();
            distinct.sort_unstable();
            distinct.dedup();

            if distinct.len() > 1 {
                validator = validator.violation(
                    ValidationError::new(
                        "dependencies",
                        "DUPLICATE_DEPENDENCY",
                        format!(
                            "{coordinate} declared with conflicting versions: {}",
                            distinct.join(", ")
                        ),
                    )
                    .with_kind(ErrorCode::DuplicateDependency)
                    .expected("a single version per coordinate")
                    .actual(distinct.join(", ")),
                );
            } else if declared.len() > 1 {
                validator = validator.warning(ValidationError::new(
                    "dependencies",
                    "REDUNDANT_DEPENDENCY",
                    format!("{coordinate} is declared {} times", declared.len()),
                ));
            }
        }

        validator
    }

    /// Check every invariant with the default rule settings and return the
    /// record unchanged
    pub fn validate(self) -> Result<Self> {
        self.validate_with(&RulesConfig::default())
    }

    /// Check every invariant and return the record unchanged.
    ///
    /// Fails with the kind of the first violation: `ValidationError`,
    /// `NotFound` (unknown signing config) or `DuplicateDependency`.
    pub fn validate_with(self, rules: &RulesConfig) -> Result<Self> {
        let result = self.check_with(rules);
        for warning in result.warnings() {
            tracing::warn!(field = %warning.field, "{}", warning.message);
        }
        result.to_result()?;

        tracing::debug!(application_id = %self.application_id, "Configuration validated");
        Ok(self)
    }

    /// Look up a build type by name
    pub fn resolve_build_type(&self, name: &str) -> Result<&BuildType> {
        self.build_types.get(name).ok_or_else(|| {
            let available: Vec<&str> = self.build_types.keys().map(String::as_str).collect();
            Error::not_found("build type", name)
                .with_context("field `buildTypes`")
                .with_suggestion(format!("Available build types: {}", available.join(", ")))
        })
    }

    /// Signing identity used by a build type; `debug` signs with the debug
    /// identity unless it names another one
    pub fn effective_signing_ref(&self, name: &str) -> Result<Option<&str>> {
        let build_type = self.resolve_build_type(name)?;
        Ok(effective_signing(name, build_type))
    }

    fn signing_names(&self) -> Vec<&str> {
        let mut names = vec![DEBUG_SIGNING];
        names.extend(
            self.signing_configs
                .iter()
                .map(String::as_str)
                .filter(|n| *n != DEBUG_SIGNING),
        );
        names
    }
}

fn effective_signing<'a>(name: &str, build_type: &'a BuildType) -> Option<&'a str> {
    match &build_type.signing_ref {
        Some(signing) => Some(signing.as_str()),
        None if name == "debug" => Some(DEBUG_SIGNING),
        None => None,
    }
}
