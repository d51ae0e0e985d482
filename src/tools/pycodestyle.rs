//! Adapter wrapping pycodestyle.
//!
//! pycodestyle is invoked per file and reports findings as
//! `path:line:column: CODE message` text lines.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;

use super::{run_tool_command, Tool, ToolError};
use crate::config::EffectiveConfig;
use crate::diagnostics::{Diagnostic, Location, Severity};
use crate::finder::SourceSet;

const NAME: &str = "pycodestyle";

lazy_static! {
    static ref FINDING: Regex =
        Regex::new(r"^(?P<path>.+?):(?P<line>\d+):(?P<col>\d+):\s+(?P<code>[EW]\d+)\s+(?P<msg>.*)$")
            .unwrap();
}

/// Exit 1 means findings were reported; anything above is a real failure.
fn exit_ok(code: i32) -> bool {
    code == 0 || code == 1
}

#[derive(Debug)]
pub struct PycodestyleTool {
    command: PathBuf,
    args: Option<Vec<String>>,
}

impl PycodestyleTool {
    pub fn new() -> Self {
        Self {
            command: PathBuf::from(NAME),
            args: None,
        }
    }

    /// Use an alternate pycodestyle executable.
    pub fn with_command<P: Into<PathBuf>>(mut self, command: P) -> Self {
        self.command = command.into();
        self
    }

    /// The stored invocation arguments, if configured.
    pub fn invocation_args(&self) -> Option<&[String]> {
        self.args.as_deref()
    }
}

impl Default for PycodestyleTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for PycodestyleTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(&mut self, config: &EffectiveConfig, sources: &SourceSet) {
        let mut args = vec![format!("--max-line-length={}", config.max_line_length)];
        args.extend(sources.files().iter().map(|f| f.display().to_string()));
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
    let code = caps["code"].to_string();
    let severity = severity_for(&code);
    Some(Diagnostic {
        source: NAME.to_string(),
        code,
        message: caps["msg"].to_string(),
        location: Location::new(
            PathBuf::from(&caps["path"]),
            caps["line"].parse().ok()?,
            caps["col"].parse().ok()?,
        ),
        severity,
    })
}

/// E9xx are runtime/syntax problems; other E codes are style errors and W
/// codes are soft warnings.
fn severity_for(code: &str) -> Severity {
    if code.starts_with("E9") {
        Severity::Error
    } else if code.starts_with('E') {
        Severity::Warning
    } else {
        Severity::Info
    }
}
