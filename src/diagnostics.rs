//! Core types for unified diagnostics.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity levels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Where a diagnostic was raised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new<P: Into<PathBuf>>(path: P, line: usize, column: usize) -> Self {
        Self {
            path: path.into(),
            line,
            column,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.path.display(), self.line, self.column)
    }
}

/// A single normalized finding from one adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Name of the adapter that produced this diagnostic.
    pub source: String,
    /// Analyzer-assigned code (e.g. "line-too-long", "E501").
    pub code: String,
    pub message: String,
    pub location: Location,
    pub severity: Severity,
}

impl Diagnostic {
    /// Identity key for deduplication: `(source, code, location)`.
    ///
    /// Two adapters flagging the same location with different codes get
    /// distinct keys; the message is deliberately not part of identity.
    pub fn key(&self) -> String {
        format!("{}|{}|{}", self.source, self.code, self.location)
    }
}

/// Concatenate per-adapter diagnostic lists in adapter-invocation order.
///
/// Emission order within an adapter is preserved. No deduplication,
/// reordering, or severity-based dropping happens here.
pub fn aggregate(per_adapter: Vec<Vec<Diagnostic>>) -> Vec<Diagnostic> {
    let mut combined = Vec::with_capacity(per_adapter.iter().map(Vec::len).sum());
    for diagnostics in per_adapter {
        combined.extend(diagnostics);
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(source: &str, code: &str, line: usize) -> Diagnostic {
        Diagnostic {
            source: source.to_string(),
            code: code.to_string(),
            message: "msg".to_string(),
            location: Location::new("a.py", line, 1),
            severity: Severity::Warning,
        }
    }

    #[test]
    fn test_key_identity() {
        let a = diag("pylint", "line-too-long", 3);
        let mut b = a.clone();
        b.message = "different message".to_string();
        assert_eq!(a.key(), b.key());

        let other_code = diag("pycodestyle", "E501", 3);
        assert_ne!(a.key(), other_code.key());
    }

    #[test]
    fn test_aggregate_preserves_order() {
        let combined = aggregate(vec![
            vec![diag("pylint", "a", 1), diag("pylint", "b", 2)],
            vec![],
            vec![diag("pyflakes", "c", 1)],
        ]);
        let codes: Vec<_> = combined.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_aggregate_keeps_cross_adapter_overlaps() {
        // Two adapters flagging the same location are both kept.
        let combined = aggregate(vec![
            vec![diag("pylint", "line-too-long", 7)],
            vec![diag("pycodestyle", "E501", 7)],
        ]);
        assert_eq!(combined.len(), 2);
        assert_ne!(combined[0].key(), combined[1].key());
    }

    #[test]
    fn test_severity_round_trip() {
        for s in ["error", "warning", "info"] {
            let parsed: Severity = s.parse().unwrap();
            assert_eq!(parsed.to_string(), s);
        }
        assert!("fatal".parse::<Severity>().is_err());
    }
}
