//! Kotlin DSL output for a [`BuildConfiguration`]
//!
//! The rendered script reads back to the same configuration through
//! [`crate::dsl::parse`], [`Declaration::from_script`](crate::extract::Declaration::from_script)
//! and [`resolve`](crate::extract::Declaration::resolve) when the
//! configuration has `debug` and `release` build types. The reader always
//! creates those two, so a record without them gains the missing ones.

use crate::model::{BuildConfiguration, BuildType, Dependency, ProguardFile, DEBUG_SIGNING};
use droidconf_core::config::PropertyTable;

const INDENT: &str = "    ";

/// Build types the build tool creates on its own; others need `create`
const IMPLICIT_BUILD_TYPES: [&str; 2] = ["debug", "release"];

#[derive(Default)]
struct KtsWriter {
    out: String,
    depth: usize,
}

impl KtsWriter {
    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self, header: impl AsRef<str>) {
        self.line(format!("{} {{", header.as_ref()));
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Kotlin string literal with `"`, `\` and `$` escaped
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '$' => quoted.push_str("\\$"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

/// Identifier, backquoted when it is not a plain Kotlin name
fn ident(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("`{name}`")
    }
}

fn proguard_arg(file: &ProguardFile) -> String {
    match file {
        ProguardFile::Default(name) => format!("getDefaultProguardFile({})", quote(name)),
        ProguardFile::Project(path) => quote(path),
    }
}

fn dependency_line(dependency: &Dependency) -> String {
    let configuration = ident(&dependency.configuration);
    let parts = [&dependency.group, &dependency.artifact, &dependency.version];
    if parts.iter().any(|part| part.contains(':')) {
        format!(
            "{configuration}(group = {}, name = {}, version = {})",
            quote(&dependency.group),
            quote(&dependency.artifact),
            quote(&dependency.version),
        )
    } else {
        format!("{configuration}({})", quote(&dependency.notation()))
    }
}

/// Render a configuration as a module `build.gradle.kts`
pub fn render_kts(config: &BuildConfiguration) -> String {
    let mut w = KtsWriter::default();

    if !config.plugins.is_empty() {
        w.open("plugins");
        for plugin in &config.plugins {
            w.line(format!("id({})", quote(plugin)));
        }
        w.close();
        w.blank();
    }

    w.open("android");
    if let Some(namespace) = &config.namespace {
        w.line(format!("namespace = {}", quote(namespace)));
    }
    w.line(format!("compileSdk = {}", config.sdk.compile));
    if let Some(ndk) = &config.ndk_version {
        w.line(format!("ndkVersion = {}", quote(ndk)));
    }

    let levels = &config.language_level;
    w.blank();
    w.open("compileOptions");
    w.line(format!(
        "sourceCompatibility = JavaVersion.{}",
        levels.source_compatibility.gradle_constant()
    ));
    w.line(format!(
        "targetCompatibility = JavaVersion.{}",
        levels.target_compatibility.gradle_constant()
    ));
    w.close();

    w.blank();
    w.open("kotlinOptions");
    w.line(format!("jvmTarget = {}", quote(levels.jvm_target.jvm_target())));
    w.close();

    w.blank();
    w.open("defaultConfig");
    w.line(format!("applicationId = {}", quote(&config.application_id)));
    w.line(format!("minSdk = {}", config.sdk.min));
    w.line(format!("targetSdk = {}", config.sdk.target));
    w.line(format!("versionCode = {}", config.version.code));
    w.line(format!("versionName = {}", quote(&config.version.name)));
    if config.multi_dex {
        w.line("multiDexEnabled = true");
    }
    w.close();

    if !config.signing_configs.is_empty() {
        w.blank();
        w.open("signingConfigs");
        for name in &config.signing_configs {
            let method = if name == DEBUG_SIGNING { "getByName" } else { "create" };
            w.line(format!("{method}({}) {{ }}", quote(name)));
        }
        w.close();
    }

    if !config.build_types.is_empty() {
        w.blank();
        w.open("buildTypes");
        for (name, build_type) in &config.build_types {
            build_type_block(&mut w, name, build_type);
        }
        w.close();
    }

    if !config.build_features.is_empty() {
        w.blank();
        w.open("buildFeatures");
        for (feature, enabled) in &config.build_features {
            w.line(format!("{} = {enabled}", ident(feature)));
        }
        w.close();
    }
    w.close();

    if let Some(source) = &config.flutter_source {
        w.blank();
        w.open("flutter");
        w.line(format!("source = {}", quote(source)));
        w.close();
    }

    if !config.dependencies.is_empty() {
        w.blank();
        w.open("dependencies");
        for dependency in &config.dependencies {
            w.line(dependency_line(dependency));
        }
        w.close();
    }

    w.finish()
}

fn build_type_block(w: &mut KtsWriter, name: &str, build_type: &BuildType) {
    let method = if IMPLICIT_BUILD_TYPES.contains(&name) {
        "getByName"
    } else {
        "create"
    };
    w.open(format!("{method}({})", quote(name)));
    w.line(format!("isMinifyEnabled = {}", build_type.minify));
    w.line(format!("isShrinkResources = {}", build_type.shrink));
    if !build_type.proguard_rules.is_empty() {
        let args: Vec<String> = build_type.proguard_rules.iter().map(proguard_arg).collect();
        w.line(format!("proguardFiles({})", args.join(", ")));
    }
    match (&build_type.signing_ref, name) {
        (Some(signing), _) => w.line(format!(
            "signingConfig = signingConfigs.getByName({})",
            quote(signing)
        )),
        // debug would otherwise pick up the debug identity again
        (None, "debug") => w.line("signingConfig = null"),
        (None, _) => {}
    }
    w.close();
}

/// `[properties]` TOML table for a property set
pub fn render_properties(properties: &PropertyTable) -> String {
    let mut out = String::from("[properties]\n");
    for (name, value) in properties.iter() {
        out.push_str(&format!("{} = {}\n", quote(name), quote(value)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse;
    use crate::extract::Declaration;
    use crate::model::{JavaVersion, SdkLevels};

    fn reread(kts: &str) -> BuildConfiguration {
        Declaration::from_script(&parse(kts).unwrap())
            .resolve(&PropertyTable::new())
            .unwrap()
    }

    fn sample() -> BuildConfiguration {
        let mut config = BuildConfiguration::new("com.acme.app", SdkLevels::new(24, 34, 35))
            .with_language_level(JavaVersion::Java17)
            .with_build_type("debug", BuildType::default().signed_with("debug"))
            .with_build_type(
                "release",
                BuildType::optimized()
                    .with_proguard(ProguardFile::Default("proguard-android-optimize.txt".into()))
                    .with_proguard(ProguardFile::Project("proguard-rules.pro".into()))
                    .signed_with("upload"),
            )
            .with_build_type("staging", BuildType::default())
            .with_dependency(Dependency::new("androidx.core", "core-ktx", "1.12.0"));
        config.namespace = Some("com.acme.app".into());
        config.plugins = vec!["com.android.application".into(), "kotlin-android".into()];
        config.ndk_version = Some("27.0.12077973".into());
        config.multi_dex = true;
        config.flutter_source = Some("../..".into());
        config.signing_configs = vec!["upload".into()];
        config.build_features.insert("viewBinding".into(), true);
        config.version.name = "2.1.0-$beta \"rc\"".into();
        config
    }

    #[test]
    fn test_reread_adds_implicit_build_types() {
        let mut config = sample();
        config.build_types.remove("debug");
        let reread = reread(&render_kts(&config));

        assert_eq!(
            reread.build_types.keys().collect::<Vec<_>>(),
            vec!["debug", "release", "staging"]
        );
        assert_eq!(reread.build_types["debug"].signing_ref.as_deref(), Some(DEBUG_SIGNING));
        assert_eq!(reread.build_types["release"], config.build_types["release"]);
    }

    #[test]
    fn test_round_trip() {
        let config = sample();
        let kts = render_kts(&config);
        assert_eq!(reread(&kts), config);
        assert!(Declaration::from_script(&parse(&kts).unwrap())
            .unrecognized
            .is_empty());
    }

    #[test]
    fn test_parsed_file_round_trip() {
        let source = r#"
            android {
                namespace = "com.acme.app"
                compileSdk = 34
                defaultConfig {
                    minSdk = 21
                }
                buildTypes {
                    debug { signingConfig = null }
                }
            }
        "#;
        let config = reread(source);
        assert_eq!(reread(&render_kts(&config)), config);
    }

    #[test]
    fn test_layout() {
        let kts = render_kts(&sample());
        assert!(kts.starts_with("plugins {\n    id(\"com.android.application\")\n"));
        assert!(kts.contains("        sourceCompatibility = JavaVersion.VERSION_17\n"));
        assert!(kts.contains("        create(\"upload\") { }\n"));
        assert!(kts.contains("        create(\"staging\") {\n"));
        assert!(kts.contains("versionName = \"2.1.0-\\$beta \\\"rc\\\"\""));
        assert!(kts.ends_with("    implementation(\"androidx.core:core-ktx:1.12.0\")\n}\n"));
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(ident("viewBinding"), "viewBinding");
        assert_eq!(ident("kotlin-android"), "`kotlin-android`");
        assert_eq!(ident("1st"), "`1st`");
    }

    #[test]
    fn test_dependency_with_colon_uses_named_arguments() {
        let dep = Dependency::new("g", "a", "1.0:classifier");
        assert_eq!(
            dependency_line(&dep),
            r#"implementation(group = "g", name = "a", version = "1.0:classifier")"#
        );
    }

    #[test]
    fn test_properties_table() {
        let mut properties = PropertyTable::new();
        properties.insert("flutter.minSdkVersion", "23");
        assert_eq!(
            render_properties(&properties),
            "[properties]\n\"flutter.minSdkVersion\" = \"23\"\n"
        );
    }
}
