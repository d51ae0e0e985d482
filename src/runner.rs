//! Orchestration of a single analysis run.
//!
//! The runner owns the effective configuration, builds one adapter per
//! enabled tool, executes every adapter's configure+run pair in parallel
//! (they share only the read-only source set and configuration), applies
//! the suppression stage, and aggregates per-adapter findings in
//! invocation order. An adapter failure is isolated: other adapters still
//! report, and the failure is surfaced rather than downgraded to "no
//! diagnostics".

use rayon::prelude::*;

use crate::config::EffectiveConfig;
use crate::diagnostics::{self, Diagnostic, Severity};
use crate::finder::SourceSet;
use crate::suppress::{self, SuppressedDiagnostic};
use crate::tools::{self, Tool, ToolError};

/// One adapter that failed to run to completion.
#[derive(Debug)]
pub struct ToolFailure {
    pub tool: String,
    pub error: ToolError,
}

/// Everything a run produced.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Unified diagnostics, adapter-invocation order then emission order.
    pub diagnostics: Vec<Diagnostic>,
    /// Diagnostics silenced by inline directives.
    pub suppressed: Vec<SuppressedDiagnostic>,
    /// Adapters that did not run to completion.
    pub tool_errors: Vec<ToolFailure>,
    /// Number of files covered by the resolved source set.
    pub scanned: usize,
}

impl RunReport {
    pub fn has_findings(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// Executes all enabled adapters against a resolved source set.
pub struct Runner {
    config: EffectiveConfig,
}

impl Runner {
    pub fn new(config: EffectiveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    /// Build adapters from the configuration and run them.
    pub fn run(&self, sources: &SourceSet) -> RunReport {
        let mut tools: Vec<Box<dyn Tool>> = Vec::new();
        let mut failures: Vec<ToolFailure> = Vec::new();
        for name in &self.config.tools {
            match tools::create(name) {
                Ok(tool) => tools.push(tool),
                Err(error) => failures.push(ToolFailure {
                    tool: name.clone(),
                    error,
                }),
            }
        }

        let mut report = self.run_tools(tools, sources);
        if !failures.is_empty() {
            failures.extend(report.tool_errors.drain(..));
            report.tool_errors = failures;
        }
        report
    }

    /// Run a caller-supplied set of adapters.
    ///
    /// The indexed parallel collect keeps invocation order; the combined
    /// output is ordered by adapter, then by emission within an adapter.
    pub fn run_tools(&self, tools: Vec<Box<dyn Tool>>, sources: &SourceSet) -> RunReport {
        let results: Vec<(String, Result<Vec<Diagnostic>, ToolError>)> = tools
            .into_par_iter()
            .map(|mut tool| {
                let name = tool.name().to_string();
                tool.configure(&self.config, sources);
                let outcome = tool.run();
                (name, outcome)
            })
            .collect();

        let mut per_tool: Vec<Vec<Diagnostic>> = Vec::new();
        let mut tool_errors: Vec<ToolFailure> = Vec::new();
        for (tool, outcome) in results {
            match outcome {
                Ok(diagnostics) => per_tool.push(diagnostics),
                Err(error) => tool_errors.push(ToolFailure { tool, error }),
            }
        }

        let combined = diagnostics::aggregate(per_tool);
        let directives = suppress::collect_directives(sources.files());
        let (diagnostics, suppressed) = suppress::apply(
            combined,
            &directives,
            self.config.report_useless_suppressions,
        );

        RunReport {
            diagnostics,
            suppressed,
            tool_errors,
            scanned: sources.files().len(),
        }
    }
}
