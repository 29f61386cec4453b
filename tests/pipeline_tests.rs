//! End-to-end release graph runs against a scripted repository.

mod support;

use plugin_release::error::{PipelineError, ReleaseError};
use plugin_release::git::{LATEST_TAG_ARGS, SHORT_REVISION_ARGS, ScriptedQuery, previous_tag_args};
use plugin_release::pipeline::{STEP_COLLECT, StepStatus, release_graph};
use plugin_release::{EnvConfig, GitInspector, NO_NOTES, ReleaseContext, ReleaseSettings};
use support::Workspace;

fn tagged_repository() -> ScriptedQuery {
    let previous = previous_tag_args("5.1.0");
    let previous: Vec<&str> = previous.iter().map(String::as_str).collect();
    ScriptedQuery::new()
        .output(SHORT_REVISION_ARGS, "abc1234")
        .output(LATEST_TAG_ARGS, "5.1.0")
        .output(&previous, "5.0.2")
}

fn context(workspace: &Workspace, query: ScriptedQuery) -> ReleaseContext {
    let settings = ReleaseSettings::load(&workspace.config_path()).expect("valid config");
    ReleaseContext::with_inspector(settings, EnvConfig::default(), GitInspector::new(query))
        .expect("context")
}

fn read_json(path: &std::path::Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path).expect("manifest written");
    serde_json::from_str(&text).expect("manifest is JSON")
}

#[test]
fn test_full_release_stages_everything() {
    let workspace = Workspace::new().with_changelog().with_outputs();
    let mut context = context(&workspace, tagged_repository());

    let report = release_graph()
        .expect("graph")
        .execute(&mut context)
        .expect("release succeeds");
    assert!(report.degraded().is_empty());
    assert_eq!(report.steps.len(), 5);

    let changelog =
        std::fs::read_to_string(workspace.deploy().join("Impactor.md")).expect("changelog staged");
    assert_eq!(
        changelog,
        "# Impactor 5.1.0+1.20.1\n\nBuilt from abc1234. Changes: \
         [5.0.2...5.1.0](https://github.com/NickImpact/Impactor/compare/5.0.2...5.1.0)\n"
    );

    assert!(workspace.deploy().join("Impactor-Fabric-5.1.0.jar").is_file());
    assert!(workspace.deploy().join("Impactor-Sponge-5.1.0.jar").is_file());
    // Copied, not moved
    assert!(
        workspace
            .root()
            .join("fabric/build/libs/Impactor-Fabric-5.1.0.jar")
            .is_file()
    );

    let fabric = read_json(&workspace.deploy().join("fabric.publish.json"));
    assert_eq!(fabric["project_id"], "Ye5Ug1xj");
    assert_eq!(fabric["version_number"], "5.1.0+1.20.1");
    assert_eq!(fabric["version_name"], "Impactor 5.1.0+1.20.1");
    assert_eq!(fabric["version_type"], "release");
    assert_eq!(fabric["game_versions"][0], "1.20.1");
    assert_eq!(fabric["loaders"][0], "fabric");
    assert_eq!(fabric["changelog"], changelog.as_str());
    assert_eq!(context.manifests().len(), 2);

    // No webhook in the environment: nothing was sent
    let dispatch = context.take_dispatch().expect("notify step ran");
    assert!(!dispatch.is_dispatched());
}

#[test]
fn test_missing_output_aborts_before_publish() {
    let workspace = Workspace::new().with_changelog();
    workspace.write("fabric/build/libs/Impactor-Fabric-5.1.0.jar", "fabric-jar");
    let mut context = context(&workspace, tagged_repository());

    let err = release_graph()
        .expect("graph")
        .execute(&mut context)
        .unwrap_err();

    match err {
        ReleaseError::Pipeline(PipelineError::StepFailed { step, reason }) => {
            assert_eq!(step, STEP_COLLECT);
            assert!(reason.contains("sponge"), "reason names the platform: {reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!workspace.deploy().join("fabric.publish.json").exists());
    assert!(context.take_dispatch().is_none());
}

#[test]
fn test_missing_notes_fall_back_to_default_text() {
    let workspace = Workspace::new().with_outputs();
    let mut context = context(&workspace, ScriptedQuery::new());

    let report = release_graph()
        .expect("graph")
        .execute(&mut context)
        .expect("release succeeds");
    assert!(report.steps.iter().all(|s| s.status == StepStatus::Succeeded));

    let staged =
        std::fs::read_to_string(workspace.deploy().join("Impactor.md")).expect("changelog staged");
    assert_eq!(staged, NO_NOTES);

    let sponge = read_json(&workspace.deploy().join("sponge.publish.json"));
    assert_eq!(sponge["changelog"], NO_NOTES);
}

#[test]
fn test_unknown_metadata_in_changelog() {
    let workspace = Workspace::new().with_changelog().with_outputs();
    let mut context = context(&workspace, ScriptedQuery::new());

    let path = context.stage_changelog().expect("staged");
    let changelog = std::fs::read_to_string(path).expect("read");
    assert!(changelog.contains("Built from Unknown."));
    assert!(changelog.contains("[Unknown...Unknown]"));
}

#[test]
fn test_rerun_overwrites_staging() {
    let workspace = Workspace::new().with_changelog().with_outputs();
    let mut context = context(&workspace, tagged_repository());
    context.collect_artifacts().expect("first collect");

    workspace.write("fabric/build/libs/Impactor-Fabric-5.1.0.jar", "rebuilt-jar");
    context.collect_artifacts().expect("second collect");

    let staged = std::fs::read_to_string(workspace.deploy().join("Impactor-Fabric-5.1.0.jar"))
        .expect("staged");
    assert_eq!(staged, "rebuilt-jar");
}
