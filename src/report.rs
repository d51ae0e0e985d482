//! Output formatting for run results.
//!
//! Two formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, Severity};
use crate::runner::RunReport;

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub workdir: String,
    pub files_scanned: usize,
    pub diagnostics: Vec<JsonDiagnostic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<JsonSuppressed>,
    pub suppressed_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_errors: Vec<JsonToolError>,
}

#[derive(Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub source: String,
    pub code: String,
    pub severity: String,
    pub path: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct JsonSuppressed {
    pub diagnostic: JsonDiagnostic,
    pub directive_line: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directive_codes: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct JsonToolError {
    pub tool: String,
    pub error: String,
}

/// Write a run report in JSON format.
pub fn write_json(workdir: &str, report: &RunReport) -> anyhow::Result<()> {
    let diagnostics: Vec<JsonDiagnostic> =
        report.diagnostics.iter().map(diagnostic_to_json).collect();
    let suppressed: Vec<JsonSuppressed> = report
        .suppressed
        .iter()
        .map(|s| JsonSuppressed {
            diagnostic: diagnostic_to_json(&s.diagnostic),
            directive_line: s.directive.line,
            directive_codes: s.directive.codes.clone(),
        })
        .collect();
    let tool_errors: Vec<JsonToolError> = report
        .tool_errors
        .iter()
        .map(|f| JsonToolError {
            tool: f.tool.clone(),
            error: f.error.to_string(),
        })
        .collect();

    let json_report = JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        workdir: workdir.to_string(),
        files_scanned: report.scanned,
        diagnostics,
        suppressed,
        suppressed_count: report.suppressed.len(),
        tool_errors,
    };

    let json = serde_json::to_string_pretty(&json_report)?;
    println!("{}", json);
    Ok(())
}

fn diagnostic_to_json(d: &Diagnostic) -> JsonDiagnostic {
    JsonDiagnostic {
        source: d.source.clone(),
        code: d.code.clone(),
        severity: d.severity.to_string(),
        path: d.location.path.display().to_string(),
        line: d.location.line,
        column: d.location.column,
        message: d.message.clone(),
    }
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write a run report in pretty (human-readable) format.
pub fn write_pretty(workdir: &str, report: &RunReport, show_suppressed: bool) {
    println!();
    print!("  ");
    print!("{}", "lintmux".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Checking: ".dimmed());
    println!("{}", workdir);
    print!("  {}", "Files:    ".dimmed());
    println!("{}", report.scanned);
    println!();

    if !report.diagnostics.is_empty() {
        write_diagnostics(&report.diagnostics);
        println!();
    }

    if !report.suppressed.is_empty() {
        if show_suppressed {
            println!("  {}", "Suppressed:".dimmed());
            for s in &report.suppressed {
                println!(
                    "    {} {} {} ({})",
                    severity_tag(s.diagnostic.severity),
                    s.diagnostic.location,
                    s.diagnostic.message.dimmed(),
                    s.diagnostic.code.dimmed(),
                );
            }
        } else {
            println!(
                "  {} diagnostic(s) suppressed by inline directives (--show-suppressed to list)",
                report.suppressed.len()
            );
        }
        println!();
    }

    for failure in &report.tool_errors {
        println!(
            "  {} {}: {}",
            "tool error".red().bold(),
            failure.tool,
            failure.error
        );
    }
    if !report.tool_errors.is_empty() {
        println!();
    }

    write_final_status(report);
    println!();
}

fn write_diagnostics(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        println!(
            "  {} {} {} [{}:{}]",
            severity_tag(d.severity),
            d.location,
            d.message,
            d.source.dimmed(),
            d.code.dimmed(),
        );
    }
}

fn severity_tag(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow(),
        Severity::Info => "info".blue(),
    }
}

fn write_final_status(report: &RunReport) {
    if !report.tool_errors.is_empty() {
        println!(
            "  {} {} tool(s) failed to run",
            "✗".red(),
            report.tool_errors.len()
        );
    } else if report.has_findings() {
        println!(
            "  {} {} diagnostic(s) found",
            "✗".red(),
            report.diagnostics.len()
        );
    } else {
        println!("  {} clean", "✓".green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Location;

    #[test]
    fn test_diagnostic_to_json_round_trip() {
        let d = Diagnostic {
            source: "pylint".to_string(),
            code: "line-too-long".to_string(),
            message: "Line too long (120/100)".to_string(),
            location: Location::new("/work/demo.py", 3, 1),
            severity: Severity::Warning,
        };
        let json = diagnostic_to_json(&d);
        assert_eq!(json.source, "pylint");
        assert_eq!(json.severity, "warning");
        assert_eq!(json.path, "/work/demo.py");
        assert_eq!(json.line, 3);
    }
}
