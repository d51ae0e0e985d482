//! Source discovery and check-path resolution.
//!
//! Turns requested roots and explicit files into a minimal, non-overlapping
//! set of check targets. Package directories (those carrying an
//! `__init__.py` marker) absorb their subpackages: a root containing
//! `R/pkg1/sub_a` and `R/pkg1/sub_b` resolves to exactly `{R/pkg1}`.

use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use thiserror::Error;
use walkdir::WalkDir;

/// Marker file that makes a directory a package.
pub const PACKAGE_MARKER: &str = "__init__.py";

/// Extension of checkable module files.
const SOURCE_EXTENSION: &str = "py";

/// Errors raised while resolving check paths.
#[derive(Error, Debug)]
pub enum FinderError {
    #[error("path not found: {0}")]
    NotFound(PathBuf),
    #[error("cannot resolve path {path}: {reason}")]
    PathResolution { path: PathBuf, reason: String },
    #[error("invalid exclusion pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: globset::Error,
    },
    #[error("walking {root}: {source}")]
    Walk {
        root: PathBuf,
        source: walkdir::Error,
    },
    #[error("all requested paths failed to resolve")]
    AllInputsFailed { errors: Vec<FinderError> },
}

/// What a check target designates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A package directory; the analyzer checks the whole subtree.
    Package,
    /// A single module file.
    Module,
}

/// A resolved, deduplicated path handed to analyzers.
///
/// Always absolute and platform-normalized. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTarget {
    path: PathBuf,
    kind: TargetKind,
}

impl CheckTarget {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }
}

/// The outcome of one resolution call.
///
/// Carries both the collapsed check targets (for analyzers that take whole
/// packages) and the flat file listing grouped by owning package (for
/// analyzers invoked per file). Per-input failures are collected in
/// `errors` without aborting the inputs that did resolve.
#[derive(Debug, Default)]
pub struct SourceSet {
    targets: Vec<CheckTarget>,
    files: Vec<PathBuf>,
    packages: BTreeMap<PathBuf, Vec<PathBuf>>,
    errors: Vec<FinderError>,
}

impl SourceSet {
    /// Collapsed, deduplicated check targets in deterministic path order.
    pub fn targets(&self) -> &[CheckTarget] {
        &self.targets
    }

    /// Every discovered or explicitly requested file, sorted.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Discovered files grouped by their outermost owning package.
    pub fn packages(&self) -> &BTreeMap<PathBuf, Vec<PathBuf>> {
        &self.packages
    }

    /// Failures for individual inputs that did not abort the call.
    pub fn errors(&self) -> &[FinderError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }
}

/// Resolve an absolute, lexically normalized form of `path`.
///
/// Relative inputs are joined onto `workdir` segment by segment; `.` and
/// `..` components are folded without touching the filesystem, and `..`
/// above the root clamps at the root rather than erroring. A path is never
/// split on a separator it does not actually contain on this platform, so
/// a component carrying a foreign separator stays one segment.
pub fn absolutize(path: &Path, workdir: &Path) -> Result<PathBuf, FinderError> {
    if path.as_os_str().is_empty() {
        return Err(FinderError::PathResolution {
            path: path.to_path_buf(),
            reason: "empty path".to_string(),
        });
    }
    if path.is_relative() && workdir.is_relative() {
        return Err(FinderError::PathResolution {
            path: path.to_path_buf(),
            reason: "working directory is not absolute".to_string(),
        });
    }

    let mut resolved = PathBuf::new();
    let components: Vec<Component> = if path.is_absolute() {
        path.components().collect()
    } else {
        workdir.components().chain(path.components()).collect()
    };

    for component in components {
        match component {
            Component::Prefix(prefix) => resolved.push(prefix.as_os_str()),
            Component::RootDir => resolved.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // Clamps at the filesystem root: pop() is a no-op there.
                resolved.pop();
            }
            Component::Normal(segment) => resolved.push(segment),
        }
    }

    if resolved.is_relative() {
        return Err(FinderError::PathResolution {
            path: path.to_path_buf(),
            reason: "could not produce an absolute path".to_string(),
        });
    }
    Ok(resolved)
}

/// Resolve requested roots and explicit files into a [`SourceSet`].
///
/// `explicit_file_mode` marks `explicit_files` as deliberately named
/// entries: they bypass hierarchy collapse (an explicitly named file is
/// kept even inside an otherwise-collapsed package) but are still subject
/// to exclusion patterns. With the flag off, explicit files join the
/// candidate set like any discovered path.
///
/// Empty inputs yield an empty set. The call fails only when every
/// requested input failed; individual failures are collected in
/// [`SourceSet::errors`].
pub fn resolve(
    explicit_files: &[PathBuf],
    roots: &[PathBuf],
    exclude_patterns: &[String],
    explicit_file_mode: bool,
    workdir: &Path,
) -> Result<SourceSet, FinderError> {
    let excludes = build_globset(exclude_patterns)?;

    let mut errors = Vec::new();
    let mut package_dirs: HashSet<PathBuf> = HashSet::new();
    let mut discovered_files: Vec<PathBuf> = Vec::new();
    let mut failed_inputs = 0usize;

    for root in roots {
        let root = match absolutize(root, workdir) {
            Ok(p) => p,
            Err(e) => {
                errors.push(e);
                failed_inputs += 1;
                continue;
            }
        };
        if !root.exists() {
            errors.push(FinderError::NotFound(root));
            failed_inputs += 1;
            continue;
        }
        if root.is_file() {
            discovered_files.push(root);
            continue;
        }
        if let Err(e) = walk_root(&root, &mut package_dirs, &mut discovered_files) {
            errors.push(e);
            failed_inputs += 1;
        }
    }

    // Candidate set: discovered packages plus standalone files (files whose
    // parent directory is not a package). Files inside packages are implied
    // by their package and never become their own candidate.
    let mut candidates: Vec<CheckTarget> = package_dirs
        .iter()
        .map(|p| CheckTarget {
            path: p.clone(),
            kind: TargetKind::Package,
        })
        .collect();
    for file in &discovered_files {
        let standalone = file
            .parent()
            .map(|parent| !package_dirs.contains(parent))
            .unwrap_or(true);
        if standalone {
            candidates.push(CheckTarget {
                path: file.clone(),
                kind: TargetKind::Module,
            });
        }
    }

    let mut kept_explicit: Vec<CheckTarget> = Vec::new();
    for file in explicit_files {
        let path = match absolutize(file, workdir) {
            Ok(p) => p,
            Err(e) => {
                errors.push(e);
                failed_inputs += 1;
                continue;
            }
        };
        if !path.exists() {
            errors.push(FinderError::NotFound(path));
            failed_inputs += 1;
            continue;
        }
        let target = CheckTarget {
            kind: if path.is_dir() {
                TargetKind::Package
            } else {
                TargetKind::Module
            },
            path,
        };
        if explicit_file_mode {
            kept_explicit.push(target);
        } else {
            candidates.push(target);
        }
    }

    let total_inputs = roots.len() + explicit_files.len();
    if total_inputs > 0 && failed_inputs == total_inputs {
        return Err(FinderError::AllInputsFailed { errors });
    }

    // Collapse runs over the complete candidate set; a later-discovered
    // ancestor would invalidate an earlier-accepted descendant, so this is
    // a single-pass reduction after all walks finish.
    let mut targets = collapse(candidates);

    // Explicitly named entries skip collapse entirely.
    for target in kept_explicit {
        if !targets.iter().any(|t| t.path == target.path) {
            targets.push(target);
        }
    }

    // Exclusion applies to the collapsed set.
    targets.retain(|t| !excludes.is_match(t.path()));
    targets.sort_by(|a, b| a.path.cmp(&b.path));
    targets.dedup_by(|a, b| a.path == b.path);

    // Restrict the file listing to surviving targets and group by package.
    for file in explicit_files {
        if let Ok(path) = absolutize(file, workdir) {
            if path.is_file() && !discovered_files.contains(&path) {
                discovered_files.push(path);
            }
        }
    }
    discovered_files.sort();
    discovered_files.dedup();
    let files: Vec<PathBuf> = discovered_files
        .into_iter()
        .filter(|f| targets.iter().any(|t| f.starts_with(t.path())))
        .collect();

    let mut packages: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for file in &files {
        if let Some(parent) = file.parent() {
            if let Some(owner) = owning_package(parent, &package_dirs) {
                packages.entry(owner).or_default().push(file.clone());
            }
        }
    }

    Ok(SourceSet {
        targets,
        files,
        packages,
        errors,
    })
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, FinderError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(false)
            .build()
            .map_err(|source| FinderError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| FinderError::Pattern {
        pattern: String::new(),
        source,
    })
}

/// Walk one root, recording package directories and module files.
///
/// Symlinks are followed; walkdir's own ancestor check guards against
/// symlink cycles.
fn walk_root(
    root: &Path,
    package_dirs: &mut HashSet<PathBuf>,
    files: &mut Vec<PathBuf>,
) -> Result<(), FinderError> {
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| FinderError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if entry.file_type().is_dir() {
            if path.join(PACKAGE_MARKER).is_file() {
                package_dirs.insert(path.to_path_buf());
            }
        } else if entry.file_type().is_file() {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext == SOURCE_EXTENSION {
                files.push(path.to_path_buf());
            }
        }
    }
    Ok(())
}

/// Hierarchy collapse: depth-ascending reduction that drops every candidate
/// already implied by an accepted ancestor. Guarantees at most one entry
/// per independent package subtree.
fn collapse(mut candidates: Vec<CheckTarget>) -> Vec<CheckTarget> {
    candidates.sort_by(|a, b| {
        let depth_a = a.path.components().count();
        let depth_b = b.path.components().count();
        depth_a.cmp(&depth_b).then_with(|| a.path.cmp(&b.path))
    });

    let mut accepted: Vec<CheckTarget> = Vec::new();
    for candidate in candidates {
        let implied = accepted.iter().any(|kept| {
            kept.kind == TargetKind::Package
                && candidate.path != kept.path
                && candidate.path.starts_with(&kept.path)
        });
        if !implied && !accepted.iter().any(|kept| kept.path == candidate.path) {
            accepted.push(candidate);
        }
    }
    accepted
}

/// The outermost package directory owning `parent`, or None when `parent`
/// itself carries no marker (a module next to packages stays standalone).
fn owning_package(parent: &Path, package_dirs: &HashSet<PathBuf>) -> Option<PathBuf> {
    if !package_dirs.contains(parent) {
        return None;
    }
    let mut top = parent;
    while let Some(up) = top.parent() {
        if package_dirs.contains(up) {
            top = up;
        } else {
            break;
        }
    }
    Some(top.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    /// R/pkg1/sub_a and R/pkg1/sub_b resolve to exactly {R/pkg1}.
    #[test]
    fn test_nested_subpackages_collapse_to_top_package() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("pkg1").join(PACKAGE_MARKER));
        touch(&root.join("pkg1/sub_a").join(PACKAGE_MARKER));
        touch(&root.join("pkg1/sub_a/mod_a.py"));
        touch(&root.join("pkg1/sub_b").join(PACKAGE_MARKER));
        touch(&root.join("pkg1/sub_b/mod_b.py"));

        let sources = resolve(&[], &[root.to_path_buf()], &[], false, root).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources.targets()[0].path(), root.join("pkg1"));
        assert_eq!(sources.targets()[0].kind(), TargetKind::Package);
        // All module files remain visible through the file listing.
        assert_eq!(sources.files().len(), 5);
    }

    #[test]
    fn test_standalone_module_next_to_package() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("pkg").join(PACKAGE_MARKER));
        touch(&root.join("pkg/inner.py"));
        touch(&root.join("script.py"));

        let sources = resolve(&[], &[root.to_path_buf()], &[], false, root).unwrap();
        let paths: Vec<_> = sources.targets().iter().map(|t| t.path().to_path_buf()).collect();
        assert_eq!(paths, vec![root.join("pkg"), root.join("script.py")]);
        assert_eq!(sources.targets()[1].kind(), TargetKind::Module);
    }

    #[test]
    fn test_exclusion_applies_to_collapsed_set() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("pkg").join(PACKAGE_MARKER));
        touch(&root.join("pkg/inner.py"));
        touch(&root.join("script.py"));

        let sources = resolve(
            &[],
            &[root.to_path_buf()],
            &["**/script.py".to_string()],
            false,
            root,
        )
        .unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources.targets()[0].path(), root.join("pkg"));
    }

    #[test]
    fn test_explicit_file_kept_inside_collapsed_package() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("pkg").join(PACKAGE_MARKER));
        let inner = root.join("pkg/inner.py");
        touch(&inner);

        let sources = resolve(
            &[inner.clone()],
            &[root.to_path_buf()],
            &[],
            true,
            root,
        )
        .unwrap();
        let paths: Vec<_> = sources.targets().iter().map(|t| t.path().to_path_buf()).collect();
        assert!(paths.contains(&root.join("pkg")));
        assert!(paths.contains(&inner), "explicit file must survive collapse");
    }

    #[test]
    fn test_excluded_explicit_file_is_dropped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let lone = root.join("lone.py");
        touch(&lone);

        let sources = resolve(
            &[lone.clone()],
            &[],
            &["**/lone.py".to_string()],
            true,
            root,
        )
        .unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn test_missing_root_does_not_abort_other_roots() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("ok/script.py"));

        let sources = resolve(
            &[],
            &[root.join("ok"), root.join("missing")],
            &[],
            false,
            root,
        )
        .unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources.errors().len(), 1);
        assert!(matches!(sources.errors()[0], FinderError::NotFound(_)));
    }

    #[test]
    fn test_all_inputs_failing_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = resolve(
            &[temp.path().join("nope.py")],
            &[temp.path().join("missing")],
            &[],
            true,
            temp.path(),
        )
        .unwrap_err();
        assert!(matches!(err, FinderError::AllInputsFailed { .. }));
    }

    #[test]
    fn test_empty_inputs_yield_empty_set() {
        let temp = TempDir::new().unwrap();
        let sources = resolve(&[], &[], &[], false, temp.path()).unwrap();
        assert!(sources.is_empty());
        assert!(sources.errors().is_empty());
    }

    #[test]
    fn test_absolutize_joins_logical_segments() {
        let workdir = Path::new("/work/dir");
        let resolved = absolutize(Path::new("a/b/c.py"), workdir).unwrap();
        assert_eq!(
            resolved,
            Path::new("/work/dir").join("a").join("b").join("c.py")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_absolutize_never_splits_on_foreign_separator() {
        // A backslash is a plain filename character here; the component
        // must survive as one segment instead of becoming two.
        let workdir = Path::new("/work");
        let resolved = absolutize(Path::new("a\\b/c.py"), workdir).unwrap();
        assert_eq!(resolved, Path::new("/work").join("a\\b").join("c.py"));
        assert_ne!(
            resolved,
            Path::new("/work").join("a").join("b").join("c.py")
        );
    }

    #[test]
    fn test_absolutize_folds_dot_components() {
        let workdir = Path::new("/work/dir");
        let resolved = absolutize(Path::new("./x/../y.py"), workdir).unwrap();
        assert_eq!(resolved, Path::new("/work/dir/y.py"));
    }

    #[test]
    fn test_absolutize_clamps_above_root() {
        // More parent components than the workdir is deep is not an error.
        let workdir = Path::new("/short");
        let resolved = absolutize(Path::new("../../../../etc.py"), workdir).unwrap();
        assert_eq!(resolved, Path::new("/etc.py"));
    }

    #[test]
    fn test_absolutize_rejects_relative_workdir() {
        let err = absolutize(Path::new("x.py"), Path::new("relative/dir")).unwrap_err();
        assert!(matches!(err, FinderError::PathResolution { .. }));
    }

    #[test]
    fn test_collapse_is_depth_ordered() {
        let targets = vec![
            CheckTarget {
                path: PathBuf::from("/r/pkg/sub"),
                kind: TargetKind::Package,
            },
            CheckTarget {
                path: PathBuf::from("/r/pkg"),
                kind: TargetKind::Package,
            },
            CheckTarget {
                path: PathBuf::from("/r/pkg/sub/deep"),
                kind: TargetKind::Package,
            },
        ];
        let collapsed = collapse(targets);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].path, PathBuf::from("/r/pkg"));
    }

    #[test]
    fn test_collapse_does_not_treat_module_as_ancestor() {
        let targets = vec![
            CheckTarget {
                path: PathBuf::from("/r/tool"),
                kind: TargetKind::Module,
            },
            CheckTarget {
                path: PathBuf::from("/r/tool/extra.py"),
                kind: TargetKind::Module,
            },
        ];
        // Only package targets imply their subtree.
        let collapsed = collapse(targets);
        assert_eq!(collapsed.len(), 2);
    }
}
