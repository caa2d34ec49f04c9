//! Android application build configuration
//!
//! This crate provides:
//! - The resolved build configuration record and its invariants
//! - A reader for module `build.gradle.kts` files
//! - Property resolution against Flutter-style defaults
//! - Kotlin DSL, TOML and JSON output
//!
//! # Example
//!
//! ```rust,no_run
//! use droidconf_android::document;
//! use droidconf_core::config::PropertyTable;
//! use std::path::Path;
//!
//! let loaded = document::load(
//!     Path::new("android/app/build.gradle.kts"),
//!     &PropertyTable::flutter_defaults(),
//! )?;
//! let config = loaded.configuration.validate()?;
//! let release = config.resolve_build_type("release")?;
//! println!("minify release: {}", release.minify);
//! # Ok::<(), droidconf_core::Error>(())
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod dsl;
pub mod extract;
pub mod model;
pub mod render;
pub mod resolve;
pub mod validate;

pub use document::{DocumentFormat, LoadedDocument};
pub use extract::{Declaration, Unrecognized, Value};
pub use model::{
    AppVersion, BuildConfiguration, BuildType, Dependency, JavaVersion, LanguageLevels,
    ProguardFile, SdkLevels,
};
pub use render::render_kts;
