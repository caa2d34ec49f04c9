//! droidconf CLI
//!
//! Checks, inspects and converts Android application build configurations.

use anyhow::Result;
use clap::{Parser, Subcommand};
use droidconf_android::{document, BuildConfiguration, DocumentFormat, LoadedDocument};
use droidconf_cli::output::{self, format_count, format_violation, Status};
use droidconf_cli::progress;
use droidconf_core::config::{Config, PropertyTable, RulesConfig};
use droidconf_core::error::{exit_codes, Error};
use droidconf_core::file_scanner::scan_build_files;
use droidconf_core::validation::ValidationResult;
use droidconf_telemetry::{TelemetryConfig, Timer};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "droidconf")]
#[command(about = "Check and convert Android application build configurations")]
#[command(version)]
struct Cli {
    /// Settings file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Write log lines to stderr as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a build configuration and report warnings
    Check {
        /// build.gradle.kts, .toml or .json file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the settings of one build type
    #[command(name = "build-type")]
    BuildType {
        /// build.gradle.kts, .toml or .json file
        file: PathBuf,
        /// Build type name (debug, release, ...)
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a build configuration to TOML or JSON
    Export {
        /// build.gradle.kts, .toml or .json file
        file: PathBuf,
        /// Output format: toml, json, kts
        #[arg(long, default_value = "toml")]
        format: DocumentFormat,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a build configuration as Kotlin DSL
    Render {
        /// build.gradle.kts, .toml or .json file
        file: PathBuf,
    },

    /// Find module build files under a directory and check each one
    Scan {
        /// Directory to scan
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective property table
    Properties {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Machine-readable outcome of checking one file
#[derive(Serialize)]
struct CheckReport {
    file: PathBuf,
    valid: bool,
    #[serde(flatten)]
    result: ValidationResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unrecognized: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<droidconf_core::error::ErrorReport>,
}

impl CheckReport {
    fn new(file: &Path, loaded: &LoadedDocument, result: ValidationResult) -> Self {
        Self {
            file: file.to_path_buf(),
            valid: result.is_valid(),
            result,
            unrecognized: loaded.unrecognized.iter().map(ToString::to_string).collect(),
            error: None,
        }
    }

    fn failed(file: &Path, err: &Error) -> Self {
        Self {
            file: file.to_path_buf(),
            valid: false,
            result: ValidationResult::new(),
            unrecognized: Vec::new(),
            error: Some(err.to_report()),
        }
    }

    fn exit_code(&self) -> i32 {
        if let Some(report) = &self.error {
            return report.code.exit_code();
        }
        match self.result.clone().to_result() {
            Ok(()) => exit_codes::SUCCESS,
            Err(err) => err.exit_code(),
        }
    }
}

struct Context {
    properties: PropertyTable,
    rules: RulesConfig,
    config: Config,
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        output::disable_colors();
    }

    droidconf_telemetry::init_with_config(
        TelemetryConfig::for_verbosity(cli.verbose, cli.quiet)
            .with_ansi(!cli.no_color)
            .with_json(cli.log_json),
    )?;

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            std::process::exit(e.exit_code());
        }
    };

    let ctx = Context {
        properties: config.schema.property_table(),
        rules: config.schema.rules.clone(),
        config,
        quiet: cli.quiet,
    };

    let exit_code = match cli.command {
        Commands::Check { file, json } => run_check(&ctx, &file, json),
        Commands::BuildType { file, name, json } => run_build_type(&ctx, &file, &name, json),
        Commands::Export {
            file,
            format,
            output,
        } => run_export(&ctx, &file, format, output.as_deref()),
        Commands::Render { file } => run_render(&ctx, &file),
        Commands::Scan { dir, json } => run_scan(&ctx, &dir, json),
        Commands::Properties { json } => run_properties(&ctx, json),
    };

    std::process::exit(exit_code);
}

/// Print an error (as a JSON report with `--json`) and return its exit code
fn fail(err: &Error, json: bool) -> i32 {
    if json {
        match serde_json::to_string_pretty(&err.to_report()) {
            Ok(report) => println!("{report}"),
            Err(_) => Status::error(&err.to_string()),
        }
    } else {
        Status::error(&err.to_string());
    }
    err.exit_code()
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{text}");
            exit_codes::SUCCESS
        }
        Err(e) => fail(&Error::from(e), false),
    }
}

/// Load and validate a configuration
fn load_valid(ctx: &Context, file: &Path) -> droidconf_core::Result<BuildConfiguration> {
    document::load(file, &ctx.properties)?
        .configuration
        .validate_with(&ctx.rules)
}

fn check_file(ctx: &Context, file: &Path) -> CheckReport {
    match document::load(file, &ctx.properties) {
        Ok(loaded) => {
            let result = loaded.configuration.check_with(&ctx.rules);
            CheckReport::new(file, &loaded, result)
        }
        Err(err) => CheckReport::failed(file, &err),
    }
}

fn print_report(ctx: &Context, report: &CheckReport) {
    let name = report.file.display().to_string();

    if let Some(error) = &report.error {
        Status::error(&format!("{name}: [{}] {}", error.code_str, error.message));
        if let Some(context) = &error.context {
            eprintln!("  Context: {context}");
        }
        if let Some(suggestion) = &error.suggestion {
            eprintln!("  Suggestion: {suggestion}");
        }
        return;
    }

    for violation in report.result.errors() {
        Status::error(&format!("{name}: {}", format_violation(violation)));
    }
    if !ctx.quiet {
        for warning in report.result.warnings() {
            Status::warning(&format!("{name}: {}", format_violation(warning)));
        }
        for skipped in &report.unrecognized {
            tracing::info!(file = %name, "Skipped {skipped}");
        }
    }

    if report.valid && !ctx.quiet {
        Status::success(&format!(
            "{name}: valid ({})",
            format_count(report.result.warnings().len(), "warning", "warnings")
        ));
    }
}

fn run_check(ctx: &Context, file: &Path, json: bool) -> i32 {
    droidconf_telemetry::timed_span!("check", file = %file.display());
    let report = check_file(ctx, file);

    if json {
        let code = print_json(&report);
        if code != exit_codes::SUCCESS {
            return code;
        }
    } else {
        print_report(ctx, &report);
    }
    report.exit_code()
}

fn run_build_type(ctx: &Context, file: &Path, name: &str, json: bool) -> i32 {
    let config = match load_valid(ctx, file) {
        Ok(config) => config,
        Err(e) => return fail(&e, json),
    };
    let build_type = match config.resolve_build_type(name) {
        Ok(build_type) => build_type,
        Err(e) => return fail(&e, json),
    };
    let signing = config.effective_signing_ref(name).ok().flatten();

    if json {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct BuildTypeReport<'a> {
            name: &'a str,
            #[serde(flatten)]
            build_type: &'a droidconf_android::BuildType,
            #[serde(skip_serializing_if = "Option::is_none")]
            effective_signing: Option<&'a str>,
        }
        return print_json(&BuildTypeReport {
            name,
            build_type,
            effective_signing: signing,
        });
    }

    Status::header(&format!("Build type {name}"));
    Status::field("minify", build_type.minify);
    Status::field("shrink", build_type.shrink);
    let rules: Vec<String> = build_type
        .proguard_rules
        .iter()
        .map(ToString::to_string)
        .collect();
    Status::field(
        "proguard rules",
        if rules.is_empty() {
            "-".to_string()
        } else {
            rules.join(", ")
        },
    );
    Status::field("signing", signing.unwrap_or("unsigned"));
    exit_codes::SUCCESS
}

fn run_export(ctx: &Context, file: &Path, format: DocumentFormat, output: Option<&Path>) -> i32 {
    let config = match load_valid(ctx, file) {
        Ok(config) => config,
        Err(e) => return fail(&e, false),
    };
    let text = match document::to_string(&config, format) {
        Ok(text) => text,
        Err(e) => return fail(&e, false),
    };

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, text) {
                return fail(
                    &Error::from(e).with_context(format!("writing {}", path.display())),
                    false,
                );
            }
            if !ctx.quiet {
                Status::success(&format!("Wrote {format} to {}", path.display()));
            }
        }
        None => print!("{text}"),
    }
    exit_codes::SUCCESS
}

fn run_render(ctx: &Context, file: &Path) -> i32 {
    match load_valid(ctx, file) {
        Ok(config) => {
            print!("{}", droidconf_android::render_kts(&config));
            exit_codes::SUCCESS
        }
        Err(e) => fail(&e, false),
    }
}

fn run_scan(ctx: &Context, dir: &Path, json: bool) -> i32 {
    let files = match scan_build_files(dir, &ctx.config.schema.scan) {
        Ok(files) => files,
        Err(e) => return fail(&e, json),
    };

    let timer = Timer::start("scan");
    let pb = progress::file_progress(files.len() as u64, ctx.quiet || json);
    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        pb.set_message(file.display().to_string());
        reports.push(check_file(ctx, file));
        pb.inc(1);
    }
    let failed = reports.iter().filter(|r| !r.valid).count();
    if failed == 0 {
        progress::finish_success(&pb, "");
    } else {
        progress::finish_error(&pb, "");
    }
    let elapsed = timer.stop();

    let exit_code = reports
        .iter()
        .map(CheckReport::exit_code)
        .find(|code| *code != exit_codes::SUCCESS)
        .unwrap_or(exit_codes::SUCCESS);

    if json {
        let code = print_json(&reports);
        return if code == exit_codes::SUCCESS { exit_code } else { code };
    }

    if files.is_empty() {
        if !ctx.quiet {
            Status::info(&format!("No build files found under {}", dir.display()));
        }
        return exit_codes::SUCCESS;
    }

    for report in &reports {
        print_report(ctx, report);
    }
    if !ctx.quiet {
        Status::info(&format!(
            "Checked {} in {}: {} failed",
            format_count(files.len(), "file", "files"),
            output::format_duration(elapsed),
            failed
        ));
    }
    exit_code
}

fn run_properties(ctx: &Context, json: bool) -> i32 {
    if json {
        return print_json(&ctx.properties);
    }
    print!("{}", droidconf_android::render::render_properties(&ctx.properties));
    if let Some(path) = &ctx.config.path {
        tracing::info!(path = %path.display(), "Overrides applied");
    }
    exit_codes::SUCCESS
}
