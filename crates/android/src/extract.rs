//! Mapping of a parsed build script onto an unresolved [`Declaration`]
//!
//! Values that come from outside the file (for example
//! `flutter.minSdkVersion.toInt()`) are kept as [`Value::Property`]
//! references and looked up later by [`Declaration::resolve`].

use crate::dsl::{Argument, Expr, Invocation, Script, Segment, Statement};
use crate::model::{Dependency, JavaVersion, ProguardFile};
use serde::Serialize;
use std::collections::BTreeMap;

/// A literal or a reference to an externally-provided property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Value<T> {
    Literal(T),
    Property(String),
    /// An integer literal that does not fit the field
    OutOfRange(i64),
}

/// A statement the extractor does not understand, kept for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unrecognized {
    pub line: usize,
    pub path: String,
}

impl std::fmt::Display for Unrecognized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.path)
    }
}

/// Build type settings as declared; `None` means not mentioned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildTypeDeclaration {
    pub minify: Option<bool>,
    pub shrink: Option<bool>,
    pub proguard_rules: Vec<ProguardFile>,
    /// `Some(None)` records an explicit `signingConfig = null`
    pub signing_ref: Option<Option<String>>,
}

/// Build declaration before property resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
    pub plugins: Vec<String>,
    pub namespace: Option<Value<String>>,
    pub application_id: Option<Value<String>>,
    pub compile_sdk: Option<Value<u32>>,
    pub min_sdk: Option<Value<u32>>,
    pub target_sdk: Option<Value<u32>>,
    pub ndk_version: Option<Value<String>>,
    pub source_compatibility: Option<JavaVersion>,
    pub target_compatibility: Option<JavaVersion>,
    pub jvm_target: Option<JavaVersion>,
    /// `kotlin { jvmToolchain(n) }`
    pub toolchain: Option<JavaVersion>,
    pub version_code: Option<Value<u32>>,
    pub version_name: Option<Value<String>>,
    pub multi_dex: Option<bool>,
    pub build_features: BTreeMap<String, bool>,
    pub signing_configs: Vec<String>,
    pub build_types: BTreeMap<String, BuildTypeDeclaration>,
    pub flutter_source: Option<String>,
    pub dependencies: Vec<Dependency>,
    pub unrecognized: Vec<Unrecognized>,
}

impl Declaration {
    /// Walk a parsed script
    pub fn from_script(script: &Script) -> Self {
        let mut extractor = Extractor::default();
        extractor.top_level(&script.statements);
        extractor.declaration
    }
}

/// `name = value` or `name(value)`; a trailing `.set` is dropped so
/// `jvmTarget.set(x)` reads like `jvmTarget = x`
fn setting(statement: &Statement) -> Option<(String, &Expr)> {
    match statement {
        Statement::Assign { target, value, .. } => Some((target.join("."), value)),
        Statement::Invoke(invocation) if invocation.body.is_none() => {
            let value = invocation.sole_arg()?;
            let name = invocation.dotted_name();
            let name = name.strip_suffix(".set").map(str::to_string).unwrap_or(name);
            Some((name, value))
        }
        Statement::Invoke(_) | Statement::Val { .. } => None,
    }
}

/// Name of a nested block: `release { }`, `getByName("release") { }`,
/// `create("staging") { }`
fn block_name(invocation: &Invocation) -> Option<String> {
    invocation.body.as_ref()?;
    match (invocation.dotted_name().as_str(), invocation.sole_arg()) {
        ("getByName" | "create" | "register" | "named" | "maybeCreate", Some(arg)) => {
            arg.as_str().map(str::to_string)
        }
        (name, None) if invocation.args.is_empty() && invocation.name.len() == 1 => {
            Some(name.to_string())
        }
        _ => None,
    }
}

/// Strip conversion calls that do not change meaning
fn trim_conversions(segments: &[Segment]) -> &[Segment] {
    let mut end = segments.len();
    while end > 1
        && ["toInt", "toString", "get"]
            .iter()
            .any(|name| segments[end - 1].is_empty_call(name))
    {
        end -= 1;
    }
    &segments[..end]
}

/// A property path such as `flutter.minSdkVersion`
fn property_path(expr: &Expr) -> Option<String> {
    let segments = trim_conversions(expr.as_chain()?);
    if segments.iter().any(|s| s.args.is_some()) {
        return None;
    }
    Some(
        segments
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join("."),
    )
}

fn int_value(expr: &Expr) -> Option<Value<u32>> {
    match expr {
        Expr::Int(value) => Some(
            u32::try_from(*value)
                .map(Value::Literal)
                .unwrap_or(Value::OutOfRange(*value)),
        ),
        Expr::Chain(_) => property_path(expr).map(Value::Property),
        _ => None,
    }
}

fn string_value(expr: &Expr) -> Option<Value<String>> {
    match expr {
        Expr::Str(value) => Some(Value::Literal(value.clone())),
        Expr::Chain(_) => property_path(expr).map(Value::Property),
        _ => None,
    }
}

fn bool_value(expr: &Expr) -> Option<bool> {
    match expr {
        Expr::Bool(value) => Some(*value),
        _ => None,
    }
}

/// `JavaVersion.VERSION_17`, `JvmTarget.JVM_17`, `"17"`, `17`
fn java_version(expr: &Expr) -> Option<JavaVersion> {
    match expr {
        Expr::Str(value) => value.parse().ok(),
        Expr::Int(value) => u32::try_from(*value).ok().and_then(JavaVersion::from_major),
        Expr::Chain(segments) => {
            let last = trim_conversions(segments).last()?;
            if last.args.is_some() {
                return None;
            }
            last.name.parse().ok()
        }
        _ => None,
    }
}

/// `signingConfigs.getByName("release")` or `signingConfigs.release`
fn signing_reference(expr: &Expr) -> Option<String> {
    let segments = trim_conversions(expr.as_chain()?);
    let [root, reference] = segments else {
        return None;
    };
    if root.name != "signingConfigs" || root.args.is_some() {
        return None;
    }
    match &reference.args {
        None => Some(reference.name.clone()),
        Some(args) if matches!(reference.name.as_str(), "getByName" | "named" | "findByName") => {
            match args.as_slice() {
                [Argument { value, .. }] => value.as_str().map(str::to_string),
                _ => None,
            }
        }
        Some(_) => None,
    }
}

fn proguard_file(expr: &Expr) -> Option<ProguardFile> {
    match expr {
        Expr::Str(path) => Some(ProguardFile::Project(path.clone())),
        Expr::Chain(segments) => match segments.as_slice() {
            [Segment {
                name,
                args: Some(args),
            }] if name == "getDefaultProguardFile" => match args.as_slice() {
                [Argument { value, .. }] => value
                    .as_str()
                    .map(|file| ProguardFile::Default(file.to_string())),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

/// Plugin id from `id("x")`, `kotlin("android")` or a bare `` `x` ``
fn plugin_id(invocation: &Invocation) -> Option<String> {
    if invocation.body.is_some() {
        return None;
    }
    let name = invocation.dotted_name();
    match (name.as_str(), invocation.sole_arg()) {
        ("id", Some(arg)) => arg.as_str().map(str::to_string),
        ("kotlin", Some(arg)) => arg
            .as_str()
            .map(|module| format!("org.jetbrains.kotlin.{module}")),
        (_, None) if invocation.args.is_empty() => Some(name.clone()),
        _ => None,
    }
}

fn dependency(invocation: &Invocation) -> Option<Dependency> {
    if invocation.body.is_some() || invocation.name.len() != 1 {
        return None;
    }
    let configuration = &invocation.name[0];

    if let Some(notation) = invocation.sole_arg().and_then(Expr::as_str) {
        return Dependency::parse_notation(configuration, notation).ok();
    }

    let named = |key: &str| {
        invocation
            .args
            .iter()
            .find(|a| a.name.as_deref() == Some(key))
            .and_then(|a| a.value.as_str())
    };
    let mut dep = Dependency::new(named("group")?, named("name")?, named("version")?);
    dep.configuration.clone_from(configuration);
    Some(dep)
}

#[derive(Default)]
struct Extractor {
    declaration: Declaration,
}

impl Extractor {
    fn skip(&mut self, scope: &str, statement: &Statement) {
        let name = match statement {
            Statement::Assign { target, .. } => target.join("."),
            Statement::Val { name, .. } => format!("val {name}"),
            Statement::Invoke(invocation) => invocation.dotted_name(),
        };
        let path = if scope.is_empty() {
            name
        } else {
            format!("{scope}.{name}")
        };
        tracing::debug!(line = statement.line(), %path, "Skipping unrecognized statement");
        self.declaration.unrecognized.push(Unrecognized {
            line: statement.line(),
            path,
        });
    }

    fn top_level(&mut self, statements: &[Statement]) {
        for statement in statements {
            match statement {
                Statement::Val { .. } => {}
                Statement::Invoke(inv) if inv.body.is_some() => {
                    let body = inv.body.as_deref().unwrap_or_default();
                    match inv.dotted_name().as_str() {
                        "plugins" => self.plugins(body),
                        "android" => self.android(body),
                        "kotlin" => self.kotlin(body),
                        "flutter" => self.flutter(body),
                        "dependencies" => self.dependencies(body),
                        _ => self.skip("", statement),
                    }
                }
                _ => self.skip("", statement),
            }
        }
    }

    fn plugins(&mut self, statements: &[Statement]) {
        for statement in statements {
            match statement {
                Statement::Invoke(inv) => match plugin_id(inv) {
                    Some(id) => self.declaration.plugins.push(id),
                    None => self.skip("plugins", statement),
                },
                _ => self.skip("plugins", statement),
            }
        }
    }

    fn android(&mut self, statements: &[Statement]) {
        for statement in statements {
            if let Statement::Invoke(inv) = statement {
                if let Some(body) = inv.body.as_deref() {
                    match inv.dotted_name().as_str() {
                        "compileOptions" => self.compile_options(body),
                        "kotlinOptions" => self.kotlin_options(body),
                        "defaultConfig" => self.default_config(body),
                        "signingConfigs" => self.signing_configs(body),
                        "buildTypes" => self.build_types(body),
                        "buildFeatures" => self.build_features(body),
                        _ => self.skip("android", statement),
                    }
                    continue;
                }
            }

            let Some((name, value)) = setting(statement) else {
                self.skip("android", statement);
                continue;
            };
            let decl = &mut self.declaration;
            let recognized = match name.as_str() {
                "namespace" => string_value(value).map(|v| decl.namespace = Some(v)),
                "compileSdk" | "compileSdkVersion" => {
                    int_value(value).map(|v| decl.compile_sdk = Some(v))
                }
                "ndkVersion" => string_value(value).map(|v| decl.ndk_version = Some(v)),
                _ => None,
            };
            if recognized.is_none() {
                self.skip("android", statement);
            }
        }
    }

    fn compile_options(&mut self, statements: &[Statement]) {
        for statement in statements {
            let decl = &mut self.declaration;
            let recognized = setting(statement).and_then(|(name, value)| match name.as_str() {
                "sourceCompatibility" => {
                    java_version(value).map(|v| decl.source_compatibility = Some(v))
                }
                "targetCompatibility" => {
                    java_version(value).map(|v| decl.target_compatibility = Some(v))
                }
                _ => None,
            });
            if recognized.is_none() {
                self.skip("android.compileOptions", statement);
            }
        }
    }

    fn kotlin_options(&mut self, statements: &[Statement]) {
        for statement in statements {
            let decl = &mut self.declaration;
            let recognized = setting(statement).and_then(|(name, value)| match name.as_str() {
                "jvmTarget" => java_version(value).map(|v| decl.jvm_target = Some(v)),
                _ => None,
            });
            if recognized.is_none() {
                self.skip("android.kotlinOptions", statement);
            }
        }
    }

    fn kotlin(&mut self, statements: &[Statement]) {
        for statement in statements {
            if let Statement::Invoke(inv) = statement {
                if inv.dotted_name() == "compilerOptions" {
                    if let Some(body) = inv.body.as_deref() {
                        self.kotlin_options(body);
                        continue;
                    }
                }
            }

            let decl = &mut self.declaration;
            let recognized = setting(statement).and_then(|(name, value)| match name.as_str() {
                "jvmToolchain" => java_version(value).map(|v| decl.toolchain = Some(v)),
                _ => None,
            });
            if recognized.is_none() {
                self.skip("kotlin", statement);
            }
        }
    }

    fn default_config(&mut self, statements: &[Statement]) {
        for statement in statements {
            let decl = &mut self.declaration;
            let recognized = setting(statement).and_then(|(name, value)| match name.as_str() {
                "applicationId" => string_value(value).map(|v| decl.application_id = Some(v)),
                "minSdk" | "minSdkVersion" => int_value(value).map(|v| decl.min_sdk = Some(v)),
                "targetSdk" | "targetSdkVersion" => {
                    int_value(value).map(|v| decl.target_sdk = Some(v))
                }
                "versionCode" => int_value(value).map(|v| decl.version_code = Some(v)),
                "versionName" => string_value(value).map(|v| decl.version_name = Some(v)),
                "multiDexEnabled" => bool_value(value).map(|v| decl.multi_dex = Some(v)),
                _ => None,
            });
            if recognized.is_none() {
                self.skip("android.defaultConfig", statement);
            }
        }
    }

    fn signing_configs(&mut self, statements: &[Statement]) {
        for statement in statements {
            let name = match statement {
                Statement::Invoke(inv) => block_name(inv),
                _ => None,
            };
            match name {
                Some(name) if !self.declaration.signing_configs.contains(&name) => {
                    self.declaration.signing_configs.push(name);
                }
                Some(_) => {}
                None => self.skip("android.signingConfigs", statement),
            }
        }
    }

    fn build_types(&mut self, statements: &[Statement]) {
        for statement in statements {
            let named = match statement {
                Statement::Invoke(inv) => block_name(inv).zip(inv.body.as_deref()),
                _ => None,
            };
            let Some((name, body)) = named else {
                self.skip("android.buildTypes", statement);
                continue;
            };

            let scope = format!("android.buildTypes.{name}");
            let mut build_type = self
                .declaration
                .build_types
                .remove(&name)
                .unwrap_or_default();
            for inner in body {
                if !Self::build_type_setting(&mut build_type, inner) {
                    self.skip(&scope, inner);
                }
            }
            self.declaration.build_types.insert(name, build_type);
        }
    }

    fn build_type_setting(build_type: &mut BuildTypeDeclaration, statement: &Statement) -> bool {
        if let Statement::Invoke(inv) = statement {
            if inv.body.is_none() && matches!(inv.dotted_name().as_str(), "proguardFiles" | "proguardFile") {
                let files: Option<Vec<ProguardFile>> =
                    inv.args.iter().map(|a| proguard_file(&a.value)).collect();
                return match files {
                    Some(files) => {
                        build_type.proguard_rules.extend(files);
                        true
                    }
                    None => false,
                };
            }
        }

        let Some((name, value)) = setting(statement) else {
            return false;
        };
        match name.as_str() {
            "isMinifyEnabled" | "minifyEnabled" => bool_value(value)
                .map(|v| build_type.minify = Some(v))
                .is_some(),
            "isShrinkResources" | "shrinkResources" => bool_value(value)
                .map(|v| build_type.shrink = Some(v))
                .is_some(),
            "signingConfig" => match value {
                Expr::Null => {
                    build_type.signing_ref = Some(None);
                    true
                }
                _ => signing_reference(value)
                    .map(|v| build_type.signing_ref = Some(Some(v)))
                    .is_some(),
            },
            _ => false,
        }
    }

    fn build_features(&mut self, statements: &[Statement]) {
        for statement in statements {
            match setting(statement).and_then(|(name, value)| Some((name, bool_value(value)?))) {
                Some((name, enabled)) => {
                    self.declaration.build_features.insert(name, enabled);
                }
                None => self.skip("android.buildFeatures", statement),
            }
        }
    }

    fn flutter(&mut self, statements: &[Statement]) {
        for statement in statements {
            match setting(statement) {
                Some((name, Expr::Str(source))) if name == "source" => {
                    self.declaration.flutter_source = Some(source.clone());
                }
                _ => self.skip("flutter", statement),
            }
        }
    }

    fn dependencies(&mut self, statements: &[Statement]) {
        for statement in statements {
            let dep = match statement {
                Statement::Invoke(inv) => dependency(inv),
                _ => None,
            };
            match dep {
                Some(dep) => self.declaration.dependencies.push(dep),
                None => self.skip("dependencies", statement),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse;

    fn extract(source: &str) -> Declaration {
        Declaration::from_script(&parse(source).unwrap())
    }

    #[test]
    fn test_sdk_values() {
        let decl = extract(
            r#"
            android {
                compileSdk = flutter.compileSdkVersion.toInt()
                defaultConfig {
                    minSdk = 24
                    targetSdkVersion(34)
                }
            }
            "#,
        );
        assert_eq!(
            decl.compile_sdk,
            Some(Value::Property("flutter.compileSdkVersion".into()))
        );
        assert_eq!(decl.min_sdk, Some(Value::Literal(24)));
        assert_eq!(decl.target_sdk, Some(Value::Literal(34)));
        assert!(decl.unrecognized.is_empty());
    }

    #[test]
    fn test_language_levels() {
        let decl = extract(
            r#"
            android {
                compileOptions {
                    sourceCompatibility = JavaVersion.VERSION_17
                    targetCompatibility = JavaVersion.VERSION_17
                }
                kotlinOptions {
                    jvmTarget = JavaVersion.VERSION_11.toString()
                }
            }
            kotlin {
                jvmToolchain(21)
                compilerOptions { jvmTarget.set(JvmTarget.JVM_17) }
            }
            "#,
        );
        assert_eq!(decl.source_compatibility, Some(JavaVersion::Java17));
        assert_eq!(decl.target_compatibility, Some(JavaVersion::Java17));
        assert_eq!(decl.jvm_target, Some(JavaVersion::Java17));
        assert_eq!(decl.toolchain, Some(JavaVersion::Java21));
    }

    #[test]
    fn test_build_types() {
        let decl = extract(
            r#"
            android {
                signingConfigs {
                    create("upload") { storeFile = file("upload.jks") }
                }
                buildTypes {
                    release {
                        isMinifyEnabled = true
                        isShrinkResources = true
                        proguardFiles(getDefaultProguardFile("proguard-android-optimize.txt"), "proguard-rules.pro")
                        signingConfig = signingConfigs.getByName("upload")
                    }
                    create("staging") {
                        signingConfig = signingConfigs.upload
                    }
                    getByName("debug") {
                        isMinifyEnabled = false
                        applicationIdSuffix = ".debug"
                    }
                }
            }
            "#,
        );

        assert_eq!(decl.signing_configs, vec!["upload"]);

        let release = &decl.build_types["release"];
        assert_eq!(release.minify, Some(true));
        assert_eq!(release.shrink, Some(true));
        assert_eq!(
            release.proguard_rules,
            vec![
                ProguardFile::Default("proguard-android-optimize.txt".into()),
                ProguardFile::Project("proguard-rules.pro".into()),
            ]
        );
        assert_eq!(release.signing_ref, Some(Some("upload".into())));
        assert_eq!(
            decl.build_types["staging"].signing_ref,
            Some(Some("upload".into()))
        );
        assert_eq!(decl.build_types["debug"].minify, Some(false));
        assert_eq!(
            decl.unrecognized,
            vec![Unrecognized {
                line: 18,
                path: "android.buildTypes.debug.applicationIdSuffix".into(),
            }]
        );
    }

    #[test]
    fn test_plugins() {
        let decl = extract(
            r#"
            plugins {
                id("com.android.application")
                kotlin("android")
                `kotlin-android`
                id("dev.flutter.flutter-gradle-plugin") apply true
            }
            "#,
        );
        assert_eq!(
            decl.plugins,
            vec![
                "com.android.application",
                "org.jetbrains.kotlin.android",
                "kotlin-android",
                "dev.flutter.flutter-gradle-plugin",
            ]
        );
    }

    #[test]
    fn test_dependencies() {
        let decl = extract(
            r#"
            dependencies {
                implementation("androidx.core:core-ktx:1.12.0")
                testImplementation(group = "junit", name = "junit", version = "4.13.2")
                implementation(platform("com.google.firebase:firebase-bom:33.0.0"))
                implementation(project(":core"))
            }
            "#,
        );
        assert_eq!(decl.dependencies.len(), 2);
        assert_eq!(decl.dependencies[1].configuration, "testImplementation");
        assert_eq!(decl.dependencies[1].notation(), "junit:junit:4.13.2");
        assert_eq!(decl.unrecognized.len(), 2);
        assert_eq!(decl.unrecognized[0].path, "dependencies.implementation");
    }

    #[test]
    fn test_unknown_top_level_blocks() {
        let decl = extract("repositories { google() }\nflutter { source = \"../..\" }");
        assert_eq!(decl.flutter_source.as_deref(), Some("../.."));
        assert_eq!(decl.unrecognized[0].path, "repositories");
        assert_eq!(decl.unrecognized[0].line, 1);
    }

    #[test]
    fn test_build_features() {
        let decl = extract("android { buildFeatures { viewBinding = true\n buildConfig = false } }");
        assert_eq!(decl.build_features.get("viewBinding"), Some(&true));
        assert_eq!(decl.build_features.get("buildConfig"), Some(&false));
    }
}
