//! Adapter wrapping pyflakes.
//!
//! pyflakes reports `path:line:column: message` text lines and assigns no
//! codes of its own, so this adapter derives stable codes from the message
//! text to keep diagnostic identity comparable across adapters.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;

use super::{run_tool_command, Tool, ToolError};
use crate::config::EffectiveConfig;
use crate::diagnostics::{Diagnostic, Location, Severity};
use crate::finder::SourceSet;

const NAME: &str = "pyflakes";

lazy_static! {
    // Column is present in current releases, absent in old ones.
    static ref FINDING: Regex =
        Regex::new(r"^(?P<path>.+?):(?P<line>\d+):(?:(?P<col>\d+):)?\s*(?P<msg>.*)$").unwrap();
}

fn exit_ok(code: i32) -> bool {
    code == 0 || code == 1
}

#[derive(Debug)]
pub struct PyflakesTool {
    command: PathBuf,
    args: Option<Vec<String>>,
}

impl PyflakesTool {
    pub fn new() -> Self {
        Self {
            command: PathBuf::from(NAME),
            args: None,
        }
    }

    /// Use an alternate pyflakes executable.
    pub fn with_command<P: Into<PathBuf>>(mut self, command: P) -> Self {
        self.command = command.into();
        self
    }

    /// The stored invocation arguments, if configured.
    pub fn invocation_args(&self) -> Option<&[String]> {
        self.args.as_deref()
    }
}

impl Default for PyflakesTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for PyflakesTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(&mut self, _config: &EffectiveConfig, sources: &SourceSet) {
        // pyflakes takes no tuning options we carry; just the files.
        let args = sources
            .files()
            .iter()
            .map(|f| f.display().to_string())
            .collect();
        self.args = Some(args);
    }

    fn run(&mut self) -> Result<Vec<Diagnostic>, ToolError> {
        let args = self.args.as_ref().ok_or(ToolError::NotConfigured)?;
        let stdout = run_tool_command(NAME, &self.command, args, exit_ok)?;
        Ok(parse_output(&stdout))
    }
}

fn parse_output(stdout: &str) -> Vec<Diagnostic> {
    stdout.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Diagnostic> {
    let caps = FINDING.captures(line)?;
    let message = caps["msg"].to_string();
    if message.is_empty() {
        return None;
    }
    let (code, severity) = classify(&message);
    Some(Diagnostic {
        source: NAME.to_string(),
        code: code.to_string(),
        message,
        location: Location::new(
            PathBuf::from(&caps["path"]),
            caps["line"].parse().ok()?,
            caps.name("col").and_then(|c| c.as_str().parse().ok()).unwrap_or(1),
        ),
        severity,
    })
}

/// Derive a stable code from pyflakes' free-form message.
fn classify(message: &str) -> (&'static str, Severity) {
    if message.contains("imported but unused") {
        ("unused-import", Severity::Warning)
    } else if message.contains("undefined name") {
        ("undefined-name", Severity::Error)
    } else if message.contains("redefinition of unused") {
        ("redefined-while-unused", Severity::Warning)
    } else if message.contains("assigned to but never used") {
        ("unused-variable", Severity::Warning)
    } else if message.contains("unable to detect undefined names") {
        ("import-star", Severity::Warning)
    } else if message.contains("invalid syntax") || message.contains("unexpected indent") {
        ("syntax-error", Severity::Error)
    } else {
        ("pyflakes", Severity::Warning)
    }
}
