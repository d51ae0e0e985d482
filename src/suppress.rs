//! Inline suppression of diagnostics via `# noqa` comments.
//!
//! Two directive shapes are recognized:
//! - `# noqa` - blanket, suppresses every diagnostic on its line
//! - `# noqa: CODE[,CODE...]` - suppresses only the listed codes
//!
//! Suppressed diagnostics are kept separately, never silently dropped.
//! A directive that suppresses nothing can itself be reported as a
//! `useless-suppression` diagnostic.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::diagnostics::{Diagnostic, Location, Severity};

/// Source name attached to diagnostics this engine emits itself.
pub const SELF_SOURCE: &str = "lintmux";
/// Code identifying a directive that suppressed nothing.
pub const USELESS_SUPPRESSION: &str = "useless-suppression";

lazy_static! {
    static ref NOQA: Regex =
        Regex::new(r"(?i)#\s*noqa\b(?::\s*(?P<codes>[A-Za-z0-9_\-]+(?:\s*,\s*[A-Za-z0-9_\-]+)*))?")
            .unwrap();
}

/// A parsed suppression directive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Directive {
    pub file: PathBuf,
    pub line: usize,
    /// Suppressed codes; empty means blanket suppression.
    pub codes: Vec<String>,
}

impl Directive {
    fn matches(&self, diagnostic: &Diagnostic) -> bool {
        if diagnostic.location.path != self.file || diagnostic.location.line != self.line {
            return false;
        }
        self.codes.is_empty()
            || self
                .codes
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&diagnostic.code))
    }
}

/// A diagnostic together with the directive that silenced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressedDiagnostic {
    pub diagnostic: Diagnostic,
    pub directive: Directive,
}

/// Parse suppression directives from one file's content.
pub fn parse_directives(file: &Path, content: &str) -> Vec<Directive> {
    let mut directives = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        if let Some(caps) = NOQA.captures(line) {
            let codes = caps
                .name("codes")
                .map(|m| {
                    m.as_str()
                        .split(',')
                        .map(|c| c.trim().to_string())
                        .filter(|c| !c.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            directives.push(Directive {
                file: file.to_path_buf(),
                line: line_num + 1,
                codes,
            });
        }
    }
    directives
}

/// Collect directives from all checked files. Unreadable files are skipped.
pub fn collect_directives(files: &[PathBuf]) -> Vec<Directive> {
    let mut directives = Vec::new();
    for file in files {
        let content = match std::fs::read_to_string(file) {
            Ok(c) => c,
            Err(_) => continue,
        };
        directives.extend(parse_directives(file, &content));
    }
    directives
}

/// Split diagnostics into active and suppressed.
///
/// With `report_useless` set, every directive that matched nothing yields
/// a `useless-suppression` diagnostic at the directive's location,
/// appended after the surviving diagnostics.
pub fn apply(
    diagnostics: Vec<Diagnostic>,
    directives: &[Directive],
    report_useless: bool,
) -> (Vec<Diagnostic>, Vec<SuppressedDiagnostic>) {
    let mut active = Vec::new();
    let mut suppressed = Vec::new();
    let mut hits = vec![false; directives.len()];

    for diagnostic in diagnostics {
        let mut matched = None;
        for (idx, directive) in directives.iter().enumerate() {
            if directive.matches(&diagnostic) {
                hits[idx] = true;
                matched = Some(directive.clone());
                break;
            }
        }
        match matched {
            Some(directive) => suppressed.push(SuppressedDiagnostic {
                diagnostic,
                directive,
            }),
            None => active.push(diagnostic),
        }
    }

    if report_useless {
        for (directive, hit) in directives.iter().zip(hits) {
            if hit {
                continue;
            }
            let what = if directive.codes.is_empty() {
                "blanket directive".to_string()
            } else {
                directive.codes.join(", ")
            };
            active.push(Diagnostic {
                source: SELF_SOURCE.to_string(),
                code: USELESS_SUPPRESSION.to_string(),
                message: format!("suppression matches no diagnostic ({})", what),
                location: Location::new(directive.file.clone(), directive.line, 1),
                severity: Severity::Warning,
            });
        }
    }

    (active, suppressed)
}
