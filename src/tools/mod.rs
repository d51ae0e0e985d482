//! Tool adapters wrapping the external analyzers.
//!
//! Each adapter translates the resolved source set and effective
//! configuration into its analyzer's native invocation shape, executes it,
//! and maps the raw findings into unified diagnostics. New analyzers are
//! added by implementing [`Tool`] and registering in [`create`]; there is
//! no shared base with inherited state.

mod pycodestyle;
mod pyflakes;
mod pylint;

pub use pycodestyle::PycodestyleTool;
pub use pyflakes::PyflakesTool;
pub use pylint::PylintTool;

use std::io;
use std::path::Path;
use std::process::Command;

use thiserror::Error;

use crate::config::EffectiveConfig;
use crate::diagnostics::Diagnostic;
use crate::finder::SourceSet;

/// Errors an adapter can surface.
///
/// An analyzer that ran to completion and reported findings is success;
/// `Execution` means it did not run to completion, which must stay
/// distinguishable from a clean empty result.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("tool was not configured before running")]
    NotConfigured,
    #[error("unknown tool {0:?}")]
    Unknown(String),
    #[error("failed to launch {command}: {source}")]
    Launch { command: String, source: io::Error },
    #[error("{tool} terminated abnormally: {detail}")]
    Execution { tool: &'static str, detail: String },
    #[error("unreadable {tool} output: {detail}")]
    Output { tool: &'static str, detail: String },
}

/// Uniform capability surface of one wrapped analyzer.
///
/// Lifecycle: Unconfigured → Configured (after `configure`) → Executed
/// (after `run`). Re-running re-executes rather than returning a cached
/// result; configuration on disk may have changed between calls.
pub trait Tool: Send + std::fmt::Debug {
    /// Adapter name, attached to every diagnostic as its `source`.
    fn name(&self) -> &'static str;

    /// Translate the shared configuration and source set into this
    /// analyzer's invocation arguments. Idempotent: identical inputs
    /// produce byte-identical stored state.
    fn configure(&mut self, config: &EffectiveConfig, sources: &SourceSet);

    /// Execute the analyzer and map raw findings into diagnostics.
    fn run(&mut self) -> Result<Vec<Diagnostic>, ToolError>;
}

/// Registered adapters with one-line descriptions, in default order.
pub const ALL_TOOLS: &[(&str, &str)] = &[
    ("pylint", "deep static analysis (pylint, JSON output)"),
    ("pycodestyle", "style checks (pycodestyle)"),
    ("pyflakes", "fast logical error checks (pyflakes)"),
];

/// Build an adapter by name.
pub fn create(name: &str) -> Result<Box<dyn Tool>, ToolError> {
    match name {
        "pylint" => Ok(Box::new(PylintTool::new())),
        "pycodestyle" => Ok(Box::new(PycodestyleTool::new())),
        "pyflakes" => Ok(Box::new(PyflakesTool::new())),
        other => Err(ToolError::Unknown(other.to_string())),
    }
}

/// Spawn an analyzer process and return its stdout.
///
/// `exit_ok` defines which exit codes mean "ran to completion" for this
/// analyzer - most of them report findings through a non-zero status.
/// Termination by signal or an out-of-range status is an `Execution`
/// error.
pub(crate) fn run_tool_command(
    tool: &'static str,
    command: &Path,
    args: &[String],
    exit_ok: impl Fn(i32) -> bool,
) -> Result<String, ToolError> {
    let output = Command::new(command)
        .args(args)
        .output()
        .map_err(|source| ToolError::Launch {
            command: command.display().to_string(),
            source,
        })?;

    let code = match output.status.code() {
        Some(code) => code,
        None => {
            return Err(ToolError::Execution {
                tool,
                detail: "terminated by signal".to_string(),
            })
        }
    };
    if !exit_ok(code) {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ToolError::Execution {
            tool,
            detail: format!("exit status {}: {}", code, stderr.trim()),
        });
    }

    String::from_utf8(output.stdout).map_err(|_| ToolError::Output {
        tool,
        detail: "stdout was not valid UTF-8".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_tools() {
        for (name, _) in ALL_TOOLS {
            let tool = create(name).unwrap();
            assert_eq!(tool.name(), *name);
        }
    }

    #[test]
    fn test_create_unknown_tool() {
        let err = create("mypy").unwrap_err();
        assert!(matches!(err, ToolError::Unknown(_)));
    }

    #[test]
    fn test_missing_binary_is_a_launch_error() {
        let err = run_tool_command(
            "pylint",
            Path::new("/nonexistent/lintmux-no-such-binary"),
            &[],
            |c| c == 0,
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::Launch { .. }));
    }
}
