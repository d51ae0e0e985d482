//! Integration tests for check-path resolution.
//!
//! These tests validate the resolver against the on-disk fixtures in
//! testdata/: package hierarchies collapse to their top package, and
//! explicitly named files resolve correctly however deep they sit
//! relative to the working directory.

use std::path::PathBuf;

use lintmux::config::EffectiveConfig;
use lintmux::finder::{self, TargetKind};
use lintmux::runner::Runner;
use lintmux::suppress;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// A root with nested subpackages yields exactly one check target: the
/// top package, never one entry per subpackage.
#[test]
fn test_no_duplicates_in_check_paths() {
    let root = testdata_path().join("duplicates");
    let sources = finder::resolve(&[], &[root.clone()], &[], false, &root)
        .expect("resolution should succeed");

    assert_eq!(sources.len(), 1);
    let target = &sources.targets()[0];
    assert_eq!(target.kind(), TargetKind::Package);
    assert_eq!(
        target.path().strip_prefix(&root).unwrap(),
        std::path::Path::new("pkg1")
    );
}

/// A file several directories below the working directory must resolve
/// normally; depth relative to the workdir is never an error.
#[test]
fn test_wont_throw_false_positive_relative_beyond_top_level() {
    let workdir = testdata_path().join("testpath");
    let file = PathBuf::from("src/mcve/foobar.py");

    let sources = finder::resolve(&[file], &[], &[], true, &workdir)
        .expect("deep relative file should resolve");
    assert_eq!(sources.len(), 1);
    assert_eq!(
        sources.targets()[0].path(),
        workdir.join("src").join("mcve").join("foobar.py")
    );

    // The clean fixture produces zero diagnostics end to end.
    let runner = Runner::new(EffectiveConfig::default());
    let report = runner.run_tools(vec![], &sources);
    assert!(report.diagnostics.is_empty());
    assert!(report.tool_errors.is_empty());
}

/// A suppression directive for a diagnostic that never fires is itself
/// reported, with a code naming the suppression as unnecessary.
#[test]
fn test_will_throw_useless_suppression() {
    let workdir = testdata_path().join("testpath");
    let file = PathBuf::from("test_useless_suppression.py");

    let sources = finder::resolve(&[file], &[], &[], true, &workdir)
        .expect("resolution should succeed");

    let config = EffectiveConfig {
        report_useless_suppressions: true,
        ..Default::default()
    };
    let report = Runner::new(config).run_tools(vec![], &sources);

    assert!(
        report
            .diagnostics
            .iter()
            .any(|d| d.code == suppress::USELESS_SUPPRESSION),
        "there should be at least one useless suppression, got: {:?}",
        report.diagnostics
    );
}

/// Resolving the same root through different spellings lands on the same
/// normalized targets.
#[test]
fn test_resolution_normalizes_dot_segments() {
    let workdir = testdata_path();
    let direct = finder::resolve(
        &[],
        &[PathBuf::from("duplicates")],
        &[],
        false,
        &workdir,
    )
    .unwrap();
    let dotted = finder::resolve(
        &[],
        &[PathBuf::from("./testpath/../duplicates")],
        &[],
        false,
        &workdir,
    )
    .unwrap();

    let a: Vec<_> = direct.targets().iter().map(|t| t.path().to_path_buf()).collect();
    let b: Vec<_> = dotted.targets().iter().map(|t| t.path().to_path_buf()).collect();
    assert_eq!(a, b);
}

/// Exclusion patterns remove collapsed targets.
#[test]
fn test_exclusion_pattern_removes_package() {
    let root = testdata_path().join("duplicates");
    let sources = finder::resolve(
        &[],
        &[root.clone()],
        &["**/pkg1".to_string()],
        false,
        &root,
    )
    .unwrap();
    assert!(sources.is_empty());
}
