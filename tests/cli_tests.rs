//! CLI integration tests driven through the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn rustack_cmd() -> Command {
    Command::cargo_bin("rustack").unwrap()
}

#[test]
fn test_list_prints_stacks_in_declaration_order() {
    rustack_cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Overrides\nDefaultVpcStack\nEksVpcPublic\nEksVpcPrivate\nWebApp\nVpcExamplesStack\n",
        ));
}

#[test]
fn test_synth_single_stack_json_is_parseable() {
    let output = rustack_cmd()
        .args(["synth", "WebApp", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let template: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
    assert!(template["Resources"].is_object());
}

#[test]
fn test_synth_unknown_stack_fails() {
    rustack_cmd()
        .args(["synth", "NoSuchStack"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NoSuchStack"));
}

#[test]
fn test_synth_writes_template_files() {
    let dir = tempdir().unwrap();
    rustack_cmd()
        .args(["synth", "WebApp", "VpcExamplesStack", "--format", "json"])
        .arg("--output")
        .arg(dir.path())
        .assert()
        .success();

    assert!(dir.path().join("WebApp.template.json").exists());
    assert!(dir.path().join("VpcExamplesStack.template.json").exists());
}

#[test]
fn test_synth_output_is_byte_identical_across_runs() {
    let run = || {
        rustack_cmd()
            .args(["synth", "--format", "yaml"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_config_file_sets_region() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("rustack.toml");
    std::fs::write(
        &config_path,
        "[environment]\nregion = \"eu-west-1\"\navailability_zones = 1\n",
    )
    .unwrap();

    rustack_cmd()
        .args(["synth", "DefaultVpcStack", "--format", "json"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("eu-west-1a"));
}

#[test]
fn test_missing_explicit_config_falls_back_to_defaults() {
    rustack_cmd()
        .args(["-v", "synth", "DefaultVpcStack"])
        .arg("--config")
        .arg("/nonexistent/rustack.toml")
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed to load config"));
}
