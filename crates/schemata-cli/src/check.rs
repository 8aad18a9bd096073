//! # Check
//!
//! Resolves the schema document, validates the data document against it
//! and reports the outcome.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use schemata_core::{Validation, Violation};
use schemata_resolve::{resolve, ResolveOptions};

use crate::load::{read_document, SubSchemaArg};

/// Exit code for data that passed validation.
pub const EXIT_VALID: u8 = 0;
/// Exit code for data with violations.
pub const EXIT_INVALID: u8 = 1;

/// Report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per violation.
    #[default]
    Text,
    /// A single JSON object.
    Json,
}

/// Arguments for a validation run.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema document (JSON, or YAML by extension).
    #[arg(long)]
    pub schema: PathBuf,

    /// Data document to validate. Omit to validate an absent value.
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// External schema document reachable as `NS#/path` from `$ref`.
    #[arg(long = "sub-schema", value_name = "NS=PATH")]
    pub sub_schemas: Vec<SubSchemaArg>,

    /// Disable type coercion.
    #[arg(long)]
    pub strict: bool,

    /// Fill declared defaults into missing properties.
    #[arg(long)]
    pub use_defaults: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl CheckArgs {
    /// Resolution options built from the flags, with sub-schemas loaded.
    pub fn options(&self) -> anyhow::Result<ResolveOptions> {
        let mut options = ResolveOptions::new()
            .strict_mode(self.strict)
            .use_defaults(self.use_defaults);
        for sub in &self.sub_schemas {
            let document = read_document(&sub.path)
                .with_context(|| format!("loading sub-schema '{}'", sub.namespace))?;
            options = options.with_sub_schema(sub.namespace.clone(), document);
        }
        Ok(options)
    }
}

/// Serialized outcome of a run.
#[derive(Debug, Serialize)]
pub struct Report {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub violations: Vec<ReportedViolation>,
}

#[derive(Debug, Serialize)]
pub struct ReportedViolation {
    pub path: String,
    pub code: String,
    pub message: String,
}

impl From<&Violation> for ReportedViolation {
    fn from(v: &Violation) -> Self {
        Self {
            path: v.instance_path.clone(),
            code: v.code.clone(),
            message: v.message.clone(),
        }
    }
}

impl From<&Validation> for Report {
    fn from(validation: &Validation) -> Self {
        Self {
            valid: validation.is_valid(),
            value: validation.value().cloned(),
            violations: validation.violations().iter().map(Into::into).collect(),
        }
    }
}

/// Resolve, validate and build the report.
pub fn check(args: &CheckArgs) -> anyhow::Result<Report> {
    let schema = read_document(&args.schema)?;
    let options = args.options()?;
    let validator = resolve(&schema, &options)
        .with_context(|| format!("resolving {}", args.schema.display()))?;

    let validation = match &args.data {
        Some(path) => validator.validate(&read_document(path)?),
        None => validator.validate_missing(),
    };
    tracing::info!(
        valid = validation.is_valid(),
        violations = validation.violations().len(),
        "validation finished"
    );
    Ok(Report::from(&validation))
}

/// Write `report` in `format`.
pub fn render(report: &Report, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Text if report.valid => writeln!(out, "valid")?,
        OutputFormat::Text => {
            for v in &report.violations {
                let path = if v.path.is_empty() { "(root)" } else { &v.path };
                writeln!(out, "{path}: {} [{}]", v.message, v.code)?;
            }
        }
    }
    Ok(())
}

/// Run the check and print the report to stdout.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<u8> {
    let report = check(args)?;
    let stdout = std::io::stdout();
    render(&report, args.format, &mut stdout.lock())?;
    Ok(if report.valid { EXIT_VALID } else { EXIT_INVALID })
}
