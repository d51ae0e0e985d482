//! Project configuration discovery and merging.
//!
//! Three formats are supported, in fixed priority order: a dedicated rc
//! file (`.lintmux.yaml` / `lintmux.yaml`), a `[tool.lintmux]` section in
//! `pyproject.toml`, and a `[lintmux]` section in the legacy `setup.cfg`.
//! The first match wins exclusively; formats are never merged with each
//! other. Invocation overrides are merged on top per option, overrides
//! always winning.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Dedicated rc file names, checked in order.
pub const RC_NAMES: &[&str] = &[".lintmux.yaml", "lintmux.yaml"];
/// General project manifest carrying a `[tool.lintmux]` section.
pub const PYPROJECT_NAME: &str = "pyproject.toml";
/// Legacy ini-style settings file carrying a `[lintmux]` section.
pub const SETUP_CFG_NAME: &str = "setup.cfg";

/// Default adapters, in invocation order.
pub const DEFAULT_TOOLS: &[&str] = &["pylint", "pycodestyle", "pyflakes"];
/// Default maximum line length handed to adapters that enforce one.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 100;

/// Which format a configuration was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Rc,
    Pyproject,
    SetupCfg,
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigFormat::Rc => write!(f, "rc file"),
            ConfigFormat::Pyproject => write!(f, "pyproject.toml"),
            ConfigFormat::SetupCfg => write!(f, "setup.cfg"),
        }
    }
}

/// Options as read from a project configuration file.
///
/// Every field is optional so that absent options fall through to the
/// built-in defaults or to invocation overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub tools: Option<Vec<String>>,
    #[serde(default)]
    pub max_line_length: Option<usize>,
    #[serde(default)]
    pub ignore_patterns: Option<Vec<String>>,
    #[serde(default)]
    pub report_useless_suppressions: Option<bool>,
}

/// Invocation-time overrides; each set option wins over the file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tools: Option<Vec<String>>,
    pub max_line_length: Option<usize>,
    pub ignore_patterns: Option<Vec<String>>,
    pub report_useless_suppressions: Option<bool>,
}

/// The single merged configuration shared read-only by all adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub tools: Vec<String>,
    pub max_line_length: usize,
    pub ignore_patterns: Vec<String>,
    pub report_useless_suppressions: bool,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            tools: DEFAULT_TOOLS.iter().map(|s| s.to_string()).collect(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            ignore_patterns: Vec::new(),
            report_useless_suppressions: false,
        }
    }
}

impl FileConfig {
    /// Merge invocation overrides on top of this file configuration.
    pub fn merge(self, overrides: &Overrides) -> EffectiveConfig {
        let defaults = EffectiveConfig::default();
        EffectiveConfig {
            tools: overrides
                .tools
                .clone()
                .or(self.tools)
                .unwrap_or(defaults.tools),
            max_line_length: overrides
                .max_line_length
                .or(self.max_line_length)
                .unwrap_or(defaults.max_line_length),
            ignore_patterns: overrides
                .ignore_patterns
                .clone()
                .or(self.ignore_patterns)
                .unwrap_or(defaults.ignore_patterns),
            report_useless_suppressions: overrides
                .report_useless_suppressions
                .or(self.report_useless_suppressions)
                .unwrap_or(defaults.report_useless_suppressions),
        }
    }
}

/// A located project configuration.
#[derive(Debug, Default)]
pub struct Located {
    pub config: FileConfig,
    /// The file the configuration came from, if any.
    pub origin: Option<(ConfigFormat, PathBuf)>,
    /// Set when a discovered file was malformed and defaults were used.
    pub warning: Option<String>,
}

/// Discover the effective file configuration for `workdir`.
///
/// The priority order is total and independent of filesystem iteration
/// order. A manifest that exists but carries no lintmux section is not a
/// match and discovery falls through; a manifest that cannot be parsed is
/// the match, reported as a warning, and yields defaults.
pub fn locate(workdir: &Path) -> Located {
    for name in RC_NAMES {
        let path = workdir.join(name);
        if path.is_file() {
            return match load_rc(&path) {
                Ok(config) => Located {
                    config,
                    origin: Some((ConfigFormat::Rc, path)),
                    warning: None,
                },
                Err(reason) => malformed(ConfigFormat::Rc, path, reason),
            };
        }
    }

    let pyproject = workdir.join(PYPROJECT_NAME);
    if pyproject.is_file() {
        match load_pyproject(&pyproject) {
            Ok(Some(config)) => {
                return Located {
                    config,
                    origin: Some((ConfigFormat::Pyproject, pyproject)),
                    warning: None,
                }
            }
            Ok(None) => {} // no [tool.lintmux] section; keep looking
            Err(reason) => return malformed(ConfigFormat::Pyproject, pyproject, reason),
        }
    }

    let setup_cfg = workdir.join(SETUP_CFG_NAME);
    if setup_cfg.is_file() {
        match load_setup_cfg(&setup_cfg) {
            Ok(Some(config)) => {
                return Located {
                    config,
                    origin: Some((ConfigFormat::SetupCfg, setup_cfg)),
                    warning: None,
                }
            }
            Ok(None) => {}
            Err(reason) => return malformed(ConfigFormat::SetupCfg, setup_cfg, reason),
        }
    }

    Located::default()
}

fn malformed(format: ConfigFormat, path: PathBuf, reason: String) -> Located {
    Located {
        config: FileConfig::default(),
        origin: Some((format, path.clone())),
        warning: Some(format!(
            "malformed {} at {}: {}; using defaults",
            format,
            path.display(),
            reason
        )),
    }
}

fn load_rc(path: &Path) -> Result<FileConfig, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_yaml::from_str(&content).map_err(|e| e.to_string())
}

/// Extract `[tool.lintmux]` from a pyproject manifest. Unrelated sections
/// are ignored without error.
fn load_pyproject(path: &Path) -> Result<Option<FileConfig>, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let value: toml::Value = toml::from_str(&content).map_err(|e| e.to_string())?;
    let section = match value.get("tool").and_then(|t| t.get("lintmux")) {
        Some(section) => section.clone(),
        None => return Ok(None),
    };
    section.try_into().map(Some).map_err(|e| e.to_string())
}

/// Extract the `[lintmux]` section from a legacy ini-style file.
///
/// setup.cfg is not a format any of our parser crates speak, so this reads
/// just enough of it: a section header followed by `key = value` lines,
/// with comma-separated lists for the multi-valued options.
fn load_setup_cfg(path: &Path) -> Result<Option<FileConfig>, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;

    let mut in_section = false;
    let mut found = false;
    let mut config = FileConfig::default();

    for (line_num, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_section = line == "[lintmux]";
            found |= in_section;
            continue;
        }
        if !in_section {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .ok_or_else(|| format!("line {}: expected key = value", line_num + 1))?;
        match key {
            "tools" => config.tools = Some(parse_list(value)),
            "max_line_length" => {
                let n = value
                    .parse::<usize>()
                    .map_err(|_| format!("line {}: max_line_length must be an integer", line_num + 1))?;
                config.max_line_length = Some(n);
            }
            "ignore_patterns" => config.ignore_patterns = Some(parse_list(value)),
            "report_useless_suppressions" => {
                let b = match value.to_lowercase().as_str() {
                    "true" | "yes" | "1" | "on" => true,
                    "false" | "no" | "0" | "off" => false,
                    other => {
                        return Err(format!(
                            "line {}: invalid boolean {:?}",
                            line_num + 1,
                            other
                        ))
                    }
                };
                config.report_useless_suppressions = Some(b);
            }
            _ => {} // unknown keys in our own section are ignored
        }
    }

    Ok(if found { Some(config) } else { None })
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
