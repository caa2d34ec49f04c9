//! Declaration validation
//!
//! Rules are expressed through a fluent [`Validator`] that collects every
//! violation instead of stopping at the first one:
//!
//! ```rust,ignore
//! use droidconf_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("applicationId", &config.application_id)
//!     .ordered("sdk.min", config.sdk.min, "sdk.target", config.sdk.target)
//!     .validate();
//!
//! for error in result.errors() {
//!     eprintln!("Validation error: {}", error);
//! }
//! ```

use crate::error::{Error, ErrorCode, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single rule violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Rule identifier
    pub code: String,
    /// Error kind this violation maps to
    pub kind: ErrorCode,
    /// Expected value (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Actual value (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl ValidationError {
    /// Create a violation of kind [`ErrorCode::ValidationError`]
    pub fn new(field: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.to_string(),
            kind: ErrorCode::ValidationError,
            expected: None,
            actual: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ErrorCode) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    #[must_use]
    pub fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Convert to Result type.
    ///
    /// The error code is the kind of the first violation; every violation is
    /// listed in the message.
    pub fn to_result(self) -> Result<()> {
        let Some(first) = self.errors.first() else {
            return Ok(());
        };

        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        let mut error = Error::new(
            first.kind,
            format!("Validation failed: {}", messages.join("; ")),
        )
        .with_context(format!("field `{}`", first.field));

        if let Some(expected) = &first.expected {
            error = error.with_suggestion(format!("Expected {expected}"));
        }

        Err(error)
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    #[must_use]
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(
                ValidationError::new(field, "REQUIRED", "Field is required")
                    .expected("non-empty value")
                    .actual("empty"),
            );
        }
        self
    }

    /// Validate against a pattern
    #[must_use]
    pub fn pattern(mut self, field: &str, value: &str, pattern: &Regex, description: &str) -> Self {
        if !pattern.is_match(value) {
            self.result.add_error(
                ValidationError::new(field, "PATTERN", format!("Must be {description}"))
                    .expected(description)
                    .actual(value),
            );
        }
        self
    }

    /// Validate a lower bound
    #[must_use]
    pub fn at_least<T: PartialOrd + std::fmt::Display>(
        mut self,
        field: &str,
        value: T,
        min: T,
    ) -> Self {
        if value < min {
            self.result.add_error(
                ValidationError::new(field, "MIN", format!("Must be at least {min}"))
                    .expected(format!(">= {min}"))
                    .actual(value.to_string()),
            );
        }
        self
    }

    /// Validate that `lower` does not exceed `upper`
    #[must_use]
    pub fn ordered<T: PartialOrd + std::fmt::Display>(
        mut self,
        lower_field: &str,
        lower: T,
        upper_field: &str,
        upper: T,
    ) -> Self {
        if lower > upper {
            self.result.add_error(
                ValidationError::new(
                    lower_field,
                    "ORDER",
                    format!("{lower_field} ({lower}) must not exceed {upper_field} ({upper})"),
                )
                .expected(format!("{lower_field} <= {upper_field}"))
                .actual(format!("{lower} > {upper}")),
            );
        }
        self
    }

    /// Validate that every value in a group is equal
    #[must_use]
    pub fn all_equal<T: PartialEq + std::fmt::Display>(
        mut self,
        field: &str,
        values: &[(&str, T)],
    ) -> Self {
        if let Some((_, first)) = values.first() {
            if values.iter().any(|(_, v)| v != first) {
                let actual: Vec<String> = values
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect();
                self.result.add_error(
                    ValidationError::new(field, "MISMATCH", "Values must refer to the same version")
                        .expected("identical values")
                        .actual(actual.join(", ")),
                );
            }
        }
        self
    }

    /// Record a prepared violation
    #[must_use]
    pub fn violation(mut self, error: ValidationError) -> Self {
        self.result.add_error(error);
        self
    }

    /// Add a warning (non-blocking)
    #[must_use]
    pub fn warn_if(mut self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result
                .add_warning(ValidationError::new(field, "WARNING", message));
        }
        self
    }

    /// Record a prepared warning
    #[must_use]
    pub fn warning(mut self, warning: ValidationError) -> Self {
        self.result.add_warning(warning);
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}
