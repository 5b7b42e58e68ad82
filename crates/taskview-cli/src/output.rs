//! Output rendering for `tv`.
//!
//! Commands build a serializable report and hand it to [`emit`]. JSON mode
//! serializes the report; text mode writes tab-separated rows for scripts;
//! pretty mode writes framed sections for terminals.
//!
//! Mode precedence: `--format`, then `--json`, then the `FORMAT` environment
//! variable, then pretty on a TTY and text otherwise.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use taskview_core::CollectionError;

const RULE_WIDTH: usize = 72;

/// Horizontal separator for pretty output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", "-".repeat(RULE_WIDTH))
}

pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// `key:` padded to a fixed column, then the value.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    let label = format!("{key}:");
    writeln!(w, "{label:<12} {}", value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Framed sections for terminals.
    Pretty,
    /// Tab-separated rows with a header line.
    Text,
    /// One pretty-printed JSON document.
    Json,
}

fn mode_from_env(value: &str) -> Option<OutputMode> {
    OutputMode::from_str(value, true).ok()
}

fn pick_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    format_flag
        .or_else(|| json_flag.then_some(OutputMode::Json))
        .or_else(|| format_env.and_then(mode_from_env))
        .unwrap_or(if is_tty {
            OutputMode::Pretty
        } else {
            OutputMode::Text
        })
}

/// Output mode for this process, from flags, `FORMAT` and whether stdout is a TTY.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let format_env = std::env::var("FORMAT").ok();
    pick_output_mode(
        format_flag,
        json_flag,
        format_env.as_deref(),
        io::stdout().is_terminal(),
    )
}

/// A command result that can be written in every output mode.
pub trait Report: Serialize {
    fn write_text(&self, w: &mut dyn Write) -> io::Result<()>;
    fn write_pretty(&self, w: &mut dyn Write) -> io::Result<()>;
}

fn write_report<R: Report>(w: &mut dyn Write, mode: OutputMode, report: &R) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *w, report)?;
            writeln!(w)?;
        }
        OutputMode::Text => report.write_text(w)?,
        OutputMode::Pretty => report.write_pretty(w)?,
    }
    Ok(())
}

/// Write a report to stdout.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn emit<R: Report>(mode: OutputMode, report: &R) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, mode, report)
}

/// A failure as shown to the user: a message, a remediation hint and a
/// machine code (`E####` for collection errors, snake_case for CLI-only ones).
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn with_details(
        message: impl Into<String>,
        suggestion: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(suggestion.into()),
            error_code: Some(error_code.into()),
        }
    }

    fn write_to(&self, w: &mut dyn Write, mode: OutputMode) -> anyhow::Result<()> {
        if mode == OutputMode::Json {
            serde_json::to_writer_pretty(&mut *w, &serde_json::json!({ "error": self }))?;
            writeln!(w)?;
            return Ok(());
        }
        writeln!(w, "error: {}", self.message)?;
        if let Some(suggestion) = &self.suggestion {
            writeln!(w, "  suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl From<&CollectionError> for CliError {
    fn from(err: &CollectionError) -> Self {
        Self::with_details(err.to_string(), err.suggestion(), err.error_code().code())
    }
}

/// Write an error to stderr.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    error.write_to(&mut out, mode)
}
