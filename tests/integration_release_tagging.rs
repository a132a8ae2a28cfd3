//! End-to-end runs of the tagging pipeline against real repositories.

mod common;

use common::TestTree;
use pretty_assertions::assert_eq;
use release_tagger::application::reporting::{Severity, StatusLine};
use release_tagger::application::use_cases::release_tagging::{
    PinMode, ReleaseTaggingConfig, ReleaseTaggingUseCase, RunSummary,
};
use release_tagger::application::use_cases::rewrite_manifest::RevisionChange;
use release_tagger::application::use_cases::update_release_tags::{ProjectClass, TagAction};
use release_tagger::domain::value_objects::release_labels::ReleaseLabels;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest>
  <remote name="origin" fetch=".." />
  <default revision="main" remote="origin" />

  <project name="platform/build" path="build" revision="v600/build" upstream="v600/build"/>
  <project name="platform/kernel" path="kernel" revision="v600" upstream="v600"/>
  <project name="tools/current" path="tools/current" revision="main" upstream="v600/tools"/>
</manifest>
"#;

fn config(tree: &TestTree) -> ReleaseTaggingConfig {
    ReleaseTaggingConfig::new(
        ReleaseLabels::new("v600", "v700").unwrap(),
        tree.root.join("tools/current"),
    )
}

async fn run(config: ReleaseTaggingConfig) -> (RunSummary, Vec<StatusLine>) {
    let mut lines: Vec<StatusLine> = Vec::new();
    let summary = ReleaseTaggingUseCase::new(config)
        .execute(&mut lines)
        .await
        .expect("run should succeed");
    (summary, lines)
}

fn standard_tree(manifest: &str) -> TestTree {
    let tree = TestTree::new();
    tree.write_manifest("default.xml", manifest);
    tree.add_project_repo("build");
    tree.add_project_repo("kernel");
    tree.add_project_repo("tools/current");
    tree
}

#[tokio::test]
async fn test_apply_creates_pushes_and_pins_tags() {
    let tree = standard_tree(MANIFEST);

    let (summary, _) = run(config(&tree).with_dry_run(false)).await;

    assert_eq!(summary.tags.count(&TagAction::Created), 3);
    assert!(tree.remote_has_tag("build", "v700/build"));
    assert!(tree.remote_has_tag("kernel", "v700"));
    assert!(tree.remote_has_tag("tools/current", "v700/tools"));

    let expected = MANIFEST
        .replace(r#"revision="v600/build""#, r#"revision="v700/build""#)
        .replace(
            r#"path="kernel" revision="v600""#,
            r#"path="kernel" revision="v700""#,
        )
        .replace(
            r#"path="tools/current" revision="main""#,
            r#"path="tools/current" revision="v700/tools""#,
        );
    assert_eq!(tree.read_manifest("v700_manifest.xml"), expected);
    assert_eq!(tree.read_manifest("default.xml"), MANIFEST);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let tree = standard_tree(MANIFEST);

    run(config(&tree).with_dry_run(false)).await;
    let first_manifest = tree.read_manifest("v700_manifest.xml");

    let (summary, lines) = run(config(&tree).with_dry_run(false)).await;

    assert_eq!(summary.tags.count(&TagAction::AlreadyExists), 3);
    assert_eq!(summary.tags.count(&TagAction::Created), 0);
    assert_eq!(tree.remote_tag_count("build"), 1);
    assert_eq!(tree.remote_tag_count("kernel"), 1);
    assert_eq!(tree.read_manifest("v700_manifest.xml"), first_manifest);
    assert!(lines
        .iter()
        .any(|l| l.message == "build -> tag v700/build already exists"));
}

#[tokio::test]
async fn test_dry_run_writes_manifest_but_no_tags() {
    let tree = standard_tree(MANIFEST);

    let (summary, lines) = run(config(&tree)).await;

    assert!(summary.dry_run);
    assert_eq!(summary.tags.count(&TagAction::WouldCreate), 3);
    assert_eq!(tree.remote_tag_count("build"), 0);
    assert_eq!(tree.remote_tag_count("kernel"), 0);
    assert_eq!(tree.remote_tag_count("tools/current"), 0);

    assert_eq!(
        lines[1],
        StatusLine::new(
            Severity::Warning,
            "Dry run, to create tags add --apply argument"
        )
    );
    assert!(tree
        .read_manifest("v700_manifest.xml")
        .contains(r#"revision="v700/build""#));
}

#[tokio::test]
async fn test_missing_checkout_is_tagged_in_current_repository() {
    let manifest = MANIFEST.replace(
        "</manifest>",
        "  <project name=\"vendor/blobs\" path=\"vendor/blobs\" revision=\"v600/blobs\" upstream=\"v600/blobs\"/>\n</manifest>",
    );
    let tree = standard_tree(&manifest);

    let (summary, lines) = run(config(&tree).with_dry_run(false)).await;

    let outcome = summary.tags.outcome("vendor/blobs").unwrap();
    assert_eq!(outcome.class, ProjectClass::Missing);
    assert!(outcome.fallback);
    assert_eq!(outcome.action, TagAction::Created);
    assert!(tree.remote_has_tag("tools/current", "v700/blobs"));
    assert!(lines
        .iter()
        .any(|l| l.message.starts_with("Creating fallback tag v700/blobs in ")));

    assert!(tree
        .read_manifest("v700_manifest.xml")
        .contains(r#"<project name="vendor/blobs" path="vendor/blobs" revision="v700/blobs" upstream="v600/blobs"/>"#));
}

#[tokio::test]
async fn test_checkout_without_git_is_skipped() {
    let manifest = MANIFEST.replace(
        "</manifest>",
        "  <project name=\"docs\" path=\"docs\" revision=\"v600/docs\" upstream=\"v600/docs\"/>\n</manifest>",
    );
    let tree = standard_tree(&manifest);
    tree.add_plain_dir("docs");

    let (summary, lines) = run(config(&tree).with_dry_run(false)).await;

    let outcome = summary.tags.outcome("docs").unwrap();
    assert_eq!(outcome.class, ProjectClass::Invalid);
    assert_eq!(outcome.action, TagAction::InvalidRepository);
    assert!(!tree.remote_has_tag("tools/current", "v700/docs"));
    assert!(lines
        .iter()
        .any(|l| l.severity == Severity::Failure && l.message == "Not a valid Git repository: docs"));

    assert_eq!(
        summary.manifest.update("docs"),
        Some(&RevisionChange::SkippedInvalid)
    );
    assert!(tree
        .read_manifest("v700_manifest.xml")
        .contains(r#"<project name="docs" path="docs" revision="v600/docs" upstream="v600/docs"/>"#));
}

#[tokio::test]
async fn test_unmapped_project_keeps_revision_and_gets_fallback_tag() {
    let manifest = r#"<manifest>
  <project name="A" path="a" revision="v600/foo" upstream="v600/foo"/>
  <project name="B" path="b" revision="main"/>
  <project name="tools/current" path="tools/current" revision="main" upstream="v600/tools"/>
</manifest>
"#;
    let tree = TestTree::new();
    tree.write_manifest("default.xml", manifest);
    tree.add_project_repo("a");
    tree.add_project_repo("b");
    tree.add_project_repo("tools/current");

    let (summary, _) = run(config(&tree).with_dry_run(false)).await;

    assert_eq!(summary.name_map.get("A"), Some("v700/foo"));
    assert!(!summary.name_map.contains("B"));
    assert!(tree.remote_has_tag("a", "v700/foo"));
    assert!(tree.remote_has_tag("tools/current", "B"));
    assert_eq!(tree.remote_tag_count("b"), 0);

    let written = tree.read_manifest("v700_manifest.xml");
    assert!(written.contains(r#"<project name="A" path="a" revision="v700/foo" upstream="v600/foo"/>"#));
    assert!(written.contains(r#"<project name="B" path="b" revision="main"/>"#));
}

#[tokio::test]
async fn test_skip_unmapped_creates_no_fallback_tag() {
    let manifest = r#"<manifest>
  <project name="B" path="b" revision="main"/>
  <project name="tools/current" path="tools/current" revision="main" upstream="v600/tools"/>
</manifest>
"#;
    let tree = TestTree::new();
    tree.write_manifest("default.xml", manifest);
    tree.add_project_repo("b");
    tree.add_project_repo("tools/current");

    let (summary, _) = run(config(&tree).with_dry_run(false).with_tag_unmapped(false)).await;

    assert_eq!(summary.tags.outcome("B").unwrap().action, TagAction::Skipped);
    assert!(!tree.remote_has_tag("tools/current", "B"));
    assert!(tree.remote_has_tag("tools/current", "v700/tools"));
}

#[tokio::test]
async fn test_previous_release_manifest_overrides_upstream() {
    let tree = standard_tree(MANIFEST);
    tree.write_manifest(
        "v600_release.xml",
        r#"<manifest><project name="platform/kernel" path="kernel" upstream="kernel-v600"/></manifest>"#,
    );

    let (summary, _) = run(config(&tree).with_dry_run(false)).await;

    assert_eq!(summary.name_map.get("platform/kernel"), Some("kernel-v700"));
    assert!(tree.remote_has_tag("kernel", "kernel-v700"));
    assert!(!tree.remote_has_tag("kernel", "v700"));
}

#[tokio::test]
async fn test_hash_pin_mode_uses_commit_ids() {
    let tree = standard_tree(MANIFEST);

    let (summary, _) = run(
        config(&tree)
            .with_dry_run(false)
            .with_pin_mode(PinMode::Hash),
    )
    .await;

    let build_head = tree.head_id("build");
    assert_eq!(
        summary.manifest.update("platform/build"),
        Some(&RevisionChange::Updated {
            from: Some("v600/build".to_string()),
            to: build_head.clone(),
        })
    );
    assert!(tree
        .read_manifest("v700_manifest.xml")
        .contains(&format!(r#"path="build" revision="{}""#, build_head)));
}

#[tokio::test]
async fn test_missing_remote_is_reported_and_run_continues() {
    let tree = standard_tree(MANIFEST);

    let (summary, lines) = run(config(&tree).with_dry_run(false).with_remote("upstream")).await;

    assert_eq!(summary.tags.failures().count(), 3);
    assert!(lines
        .iter()
        .any(|l| l.severity == Severity::Warning && l.message.contains("Remote not found: upstream")));
    assert_eq!(summary.manifest.updated_count(), 3);
}

#[tokio::test]
async fn test_unusable_tag_names_fail_per_project() {
    let tree = standard_tree(MANIFEST);
    let config = ReleaseTaggingConfig::new(
        ReleaseLabels::new("v600", "v700 rc").unwrap(),
        tree.root.join("tools/current"),
    )
    .with_dry_run(false);

    let (summary, lines) = run(config).await;

    assert_eq!(summary.tags.failures().count(), 3);
    assert!(matches!(
        summary.tags.outcome("platform/build").unwrap().action,
        TagAction::Failed(ref reason) if reason.contains("Invalid tag name: v700 rc/build")
    ));
    assert!(lines
        .iter()
        .any(|l| l.severity == Severity::Warning && l.message.contains("Invalid tag name")));
    assert_eq!(tree.remote_tag_count("build"), 0);
}
