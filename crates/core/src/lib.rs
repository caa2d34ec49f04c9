//! Core utilities for droidconf
//!
//! This crate provides functionality shared by the declaration model and the CLI:
//!
//! - **Error handling**: errors with codes, context, and recovery suggestions
//! - **Validation**: a fluent validator collecting errors and warnings
//! - **Configuration**: TOML tool settings and the property table
//! - **File scanning**: build file discovery with exclude patterns
//!
//! # Example
//!
//! ```rust,no_run
//! use droidconf_core::config::Config;
//!
//! let config = Config::load(None).expect("settings");
//! let properties = config.schema.property_table();
//! assert!(properties.get("flutter.minSdkVersion").is_some());
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod file_scanner;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, PropertyTable};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::file_scanner::FileScanner;
    pub use crate::validation::{ValidationError, ValidationResult, Validator};
}
