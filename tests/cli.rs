mod common;

use common::{handling_manifest, handling_meta, TestEnv};
use predicates::str::contains;
use std::fs;

#[test]
fn help_describes_the_tool() {
    TestEnv::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Merge FiveM vehicle resources"))
        .stdout(contains("--output"))
        .stdout(contains("--no-lint"));
}

#[test]
fn version_is_reported() {
    TestEnv::new()
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("vmerge"));
}

#[test]
fn output_option_is_required() {
    TestEnv::new().cmd().arg("somewhere").assert().failure();
}

#[test]
fn existing_output_directory_aborts_before_any_work() {
    let env = TestEnv::new();
    env.bundle("exists")
        .manifest(&handling_manifest())
        .data_file("data/handling.meta", &handling_meta("EXISTS", "1440.0"));
    fs::create_dir(env.output()).unwrap();

    env.cmd()
        .args(["exists", "--output", "merged"])
        .assert()
        .failure()
        .stderr(contains("already exists"));
}

#[test]
fn missing_input_path_aborts() {
    let env = TestEnv::new();
    env.cmd()
        .args(["no-such-bundle", "--output", "merged"])
        .assert()
        .failure()
        .stderr(contains("does not exist"));
    assert!(!env.output().exists());
}

#[test]
fn missing_temp_path_aborts() {
    let env = TestEnv::new();
    env.bundle("t")
        .manifest(&handling_manifest())
        .data_file("data/handling.meta", &handling_meta("TEMPY", "1441.0"));

    // a bare command, since TestEnv::cmd pins --temp to the env root
    let mut cmd = assert_cmd::Command::cargo_bin("vmerge").expect("vmerge binary");
    cmd.current_dir(env.path())
        .args(["t", "--output", "merged", "--temp", "missing-temp"])
        .assert()
        .failure()
        .stderr(contains("does not exist"));
}

#[test]
fn empty_bundle_is_skipped_but_run_fails_without_any_mergeable_input() {
    let env = TestEnv::new();
    fs::create_dir(env.path().join("hollow")).unwrap();

    env.cmd()
        .args(["hollow", "--output", "merged"])
        .assert()
        .failure()
        .stderr(contains("no manifest and no subdirectories"))
        .stderr(contains("mergeable"));
}

#[test]
fn no_lint_emits_compact_documents() {
    let env = TestEnv::new();
    env.bundle("la")
        .manifest(&handling_manifest())
        .data_file("data/handling.meta", &handling_meta("LINTA", "1442.0"))
        .stream_file("la.yft");
    env.bundle("lb")
        .manifest(&handling_manifest())
        .data_file("data/handling.meta", &handling_meta("LINTB", "1443.0"))
        .stream_file("lb.yft");

    env.cmd()
        .args(["la", "lb", "--output", "merged", "--no-lint"])
        .assert()
        .success();
    let handling = env.read_output("data/handling.meta");
    // merged output (second pass rewrites the document) stays on one line
    assert_eq!(handling.lines().count(), 1);
    assert!(handling.contains("LINTA"));
    assert!(handling.contains("LINTB"));
}

#[test]
fn syntax_error_in_manifest_is_fatal_and_names_the_line() {
    let env = TestEnv::new();
    env.bundle("broken")
        .manifest("fx_version 'cerulean'\nfiles {\n  'data/handling.meta',\n");

    env.cmd()
        .args(["broken", "--output", "merged"])
        .assert()
        .failure()
        .stderr(contains("line 2"));
}
