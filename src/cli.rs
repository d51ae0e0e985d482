//! Command-line interface for lintmux.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{self, Overrides};
use crate::finder;
use crate::report;
use crate::runner::Runner;
use crate::tools;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FINDINGS: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Multi-tool static analysis orchestrator for Python projects.
///
/// lintmux resolves the requested paths into a minimal set of check
/// targets, discovers project configuration, runs every enabled analyzer
/// against the targets, and reports their findings as one unified stream.
#[derive(Parser)]
#[command(name = "lintmux")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the configured analyzers against the given paths
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// List the available tool adapters
    Tools,
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Paths to check (directories are walked, files are checked as-is)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Glob patterns for paths to exclude
    #[arg(short, long = "ignore")]
    pub ignore: Vec<String>,

    /// Tools to run (default: from configuration)
    #[arg(short, long = "tool")]
    pub tools: Vec<String>,

    /// Maximum line length handed to analyzers that enforce one
    #[arg(long)]
    pub max_line_length: Option<usize>,

    /// Report suppression directives that suppress nothing
    #[arg(long)]
    pub report_useless_suppressions: bool,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Working directory for configuration discovery and relative paths
    /// (default: the current directory)
    #[arg(short, long)]
    pub workdir: Option<PathBuf>,

    /// Show suppressed diagnostics in output
    #[arg(long)]
    pub show_suppressed: bool,
}

impl CheckArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            tools: if self.tools.is_empty() {
                None
            } else {
                Some(self.tools.clone())
            },
            max_line_length: self.max_line_length,
            ignore_patterns: if self.ignore.is_empty() {
                None
            } else {
                Some(self.ignore.clone())
            },
            report_useless_suppressions: if self.report_useless_suppressions {
                Some(true)
            } else {
                None
            },
        }
    }
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let workdir = match &args.workdir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let workdir = if workdir.is_absolute() {
        workdir
    } else {
        std::env::current_dir()?.join(&workdir)
    };

    // Configuration discovery is anchored at the explicit workdir, never
    // at ambient process state.
    let located = config::locate(&workdir);
    if let Some(warning) = &located.warning {
        eprintln!("Warning: {}", warning);
    }
    let effective = located.config.merge(&args.overrides());

    // Paths that exist as files were named deliberately; everything else
    // is treated as a root to walk.
    let (explicit, roots) = split_paths(&args.paths, &workdir);
    let explicit_file_mode = roots.is_empty() && !explicit.is_empty();

    let sources = match finder::resolve(
        &explicit,
        &roots,
        &effective.ignore_patterns,
        explicit_file_mode,
        &workdir,
    ) {
        Ok(sources) => sources,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    for error in sources.errors() {
        eprintln!("Warning: {}", error);
    }

    if sources.is_empty() {
        eprintln!("Warning: no files to check");
        return Ok(EXIT_SUCCESS);
    }

    let runner = Runner::new(effective);
    let result = runner.run(&sources);

    let workdir_str = workdir.display().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&workdir_str, &result)?,
        _ => report::write_pretty(&workdir_str, &result, args.show_suppressed),
    }

    if !result.tool_errors.is_empty() {
        Ok(EXIT_ERROR)
    } else if result.has_findings() {
        Ok(EXIT_FINDINGS)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Partition requested paths into explicitly named files and walkable
/// roots. Nonexistent paths are passed through as roots so the resolver
/// reports them as per-input failures.
fn split_paths(paths: &[PathBuf], workdir: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut explicit = Vec::new();
    let mut roots = Vec::new();
    for path in paths {
        let probe = if path.is_absolute() {
            path.clone()
        } else {
            workdir.join(path)
        };
        if probe.is_file() {
            explicit.push(path.clone());
        } else {
            roots.push(path.clone());
        }
    }
    (explicit, roots)
}

/// Run the tools command.
pub fn run_tools_list() -> anyhow::Result<i32> {
    println!("Available tools:");
    println!();
    for (name, description) in tools::ALL_TOOLS {
        println!("  {:<14} {}", name, description);
    }
    println!();
    println!("Usage:");
    println!("  lintmux check <path> --tool <name>");
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_split_paths_separates_files_from_roots() {
        let temp = TempDir::new().unwrap();
        let workdir = temp.path();
        fs::write(workdir.join("a.py"), "").unwrap();
        fs::create_dir(workdir.join("pkg")).unwrap();

        let (explicit, roots) =
            split_paths(&[PathBuf::from("a.py"), PathBuf::from("pkg")], workdir);
        assert_eq!(explicit, vec![PathBuf::from("a.py")]);
        assert_eq!(roots, vec![PathBuf::from("pkg")]);
    }

    #[test]
    fn test_missing_path_becomes_a_root() {
        let temp = TempDir::new().unwrap();
        let (explicit, roots) = split_paths(&[PathBuf::from("missing.py")], temp.path());
        assert!(explicit.is_empty());
        assert_eq!(roots, vec![PathBuf::from("missing.py")]);
    }

    #[test]
    fn test_overrides_only_carry_given_flags() {
        let args = CheckArgs {
            paths: vec![PathBuf::from(".")],
            ignore: vec![],
            tools: vec!["pylint".to_string()],
            max_line_length: None,
            report_useless_suppressions: false,
            format: "pretty".to_string(),
            workdir: None,
            show_suppressed: false,
        };
        let overrides = args.overrides();
        assert_eq!(overrides.tools, Some(vec!["pylint".to_string()]));
        assert!(overrides.max_line_length.is_none());
        assert!(overrides.ignore_patterns.is_none());
        assert!(overrides.report_useless_suppressions.is_none());
    }
}
