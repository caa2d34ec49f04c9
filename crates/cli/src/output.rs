//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use droidconf_core::validation::ValidationError;
use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print a key/value line
    pub fn field(name: &str, value: impl std::fmt::Display) {
        println!("  {:<20} {}", name.dimmed(), value);
    }
}

/// Disable colored output globally
pub fn disable_colors() {
    owo_colors::set_override(false);
}

/// One-line description of a rule violation or warning
pub fn format_violation(violation: &ValidationError) -> String {
    let mut line = format!("{}: {}", violation.field, violation.message);
    match (&violation.expected, &violation.actual) {
        (Some(expected), Some(actual)) => {
            line.push_str(&format!(" (expected {expected}, found {actual})"));
        }
        (Some(expected), None) => line.push_str(&format!(" (expected {expected})")),
        (None, Some(actual)) => line.push_str(&format!(" (found {actual})")),
        (None, None) => {}
    }
    line
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{mins}m {remaining_secs:.0}s")
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_duration_ms() {
        let d = Duration::from_millis(500);
        assert_eq!(format_duration(d), "500ms");
    }

    #[test]
    fn test_format_duration_secs() {
        let d = Duration::from_secs_f32(5.5);
        assert_eq!(format_duration(d), "5.5s");
    }

    #[test]
    fn test_format_duration_mins() {
        let d = Duration::from_secs(125);
        assert_eq!(format_duration(d), "2m 5s");
    }

    #[test]
    fn test_format_count_singular() {
        assert_eq!(format_count(1, "file", "files"), "1 file");
    }

    #[test]
    fn test_format_count_plural() {
        assert_eq!(format_count(5, "warning", "warnings"), "5 warnings");
    }

    #[test]
    fn test_format_violation() {
        let violation = ValidationError::new("sdk.min", "ORDER", "sdk.min must not exceed sdk.target")
            .expected("sdk.min <= sdk.target")
            .actual("30 > 21");
        assert_eq!(
            format_violation(&violation),
            "sdk.min: sdk.min must not exceed sdk.target (expected sdk.min <= sdk.target, found 30 > 21)"
        );

        let warning = ValidationError::new("applicationId", "WARNING", "Example id");
        assert_eq!(format_violation(&warning), "applicationId: Example id");
    }
}
