//! Adapter wrapping pylint.
//!
//! pylint accepts whole package directories, so this adapter consumes the
//! collapsed check targets rather than the per-file listing.

use serde::Deserialize;
use std::path::PathBuf;

use super::{run_tool_command, Tool, ToolError};
use crate::config::EffectiveConfig;
use crate::diagnostics::{Diagnostic, Location, Severity};
use crate::finder::SourceSet;

const NAME: &str = "pylint";

/// pylint's exit status is a bitmask; 1..=31 means messages were issued,
/// 32 means usage error.
fn exit_ok(code: i32) -> bool {
    (0..32).contains(&code)
}

#[derive(Debug)]
pub struct PylintTool {
    command: PathBuf,
    args: Option<Vec<String>>,
}

impl PylintTool {
    pub fn new() -> Self {
        Self {
            command: PathBuf::from(NAME),
            args: None,
        }
    }

    /// Use an alternate pylint executable.
    pub fn with_command<P: Into<PathBuf>>(mut self, command: P) -> Self {
        self.command = command.into();
        self
    }

    /// The stored invocation arguments, if configured.
    pub fn invocation_args(&self) -> Option<&[String]> {
        self.args.as_deref()
    }

    /// Check paths handed to pylint: the collapsed targets, rendered with
    /// the platform's native separator.
    fn check_paths(sources: &SourceSet) -> Vec<String> {
        sources
            .targets()
            .iter()
            .map(|t| t.path().display().to_string())
            .collect()
    }
}

impl Default for PylintTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for PylintTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(&mut self, config: &EffectiveConfig, sources: &SourceSet) {
        let mut args = vec![
            "--output-format=json".to_string(),
            format!("--max-line-length={}", config.max_line_length),
        ];
        if config.report_useless_suppressions {
            // Let pylint report its own unused `# pylint: disable` entries.
            args.push("--enable=useless-suppression".to_string());
        }
        args.extend(Self::check_paths(sources));
        self.args = Some(args);
    }

    fn run(&mut self) -> Result<Vec<Diagnostic>, ToolError> {
        let args = self.args.as_ref().ok_or(ToolError::NotConfigured)?;
        let stdout = run_tool_command(NAME, &self.command, args, exit_ok)?;
        parse_output(&stdout)
    }
}

/// One entry of pylint's JSON report.
#[derive(Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: String,
    path: PathBuf,
    line: usize,
    #[serde(default)]
    column: usize,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default, rename = "message-id")]
    message_id: Option<String>,
    message: String,
}

fn parse_output(stdout: &str) -> Result<Vec<Diagnostic>, ToolError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<RawMessage> = serde_json::from_str(trimmed).map_err(|e| ToolError::Output {
        tool: NAME,
        detail: e.to_string(),
    })?;
    Ok(raw.into_iter().map(to_diagnostic).collect())
}

fn to_diagnostic(raw: RawMessage) -> Diagnostic {
    let severity = match raw.kind.as_str() {
        "fatal" | "error" => Severity::Error,
        "warning" => Severity::Warning,
        // convention, refactor, information
        _ => Severity::Info,
    };
    let code = raw
        .symbol
        .or(raw.message_id)
        .unwrap_or_else(|| "unknown".to_string());
    Diagnostic {
        source: NAME.to_string(),
        code,
        message: raw.message,
        location: Location::new(raw.path, raw.line, raw.column),
        severity,
    }
}
