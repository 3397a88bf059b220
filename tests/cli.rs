use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("cisense").unwrap();
    // Start from a clean environment so a real CI run does not leak in.
    cmd.env_clear();
    cmd
}

#[test]
fn no_subcommand_prints_help_and_fails() {
    cmd().assert().failure().stderr(contains("Usage"));
}

#[test]
fn info_outside_ci() {
    cmd()
        .arg("info")
        .assert()
        .success()
        .stdout(contains("is_ci: false"));
}

#[test]
fn info_renders_travis_facts() {
    cmd()
        .arg("info")
        .env("TRAVIS", "true")
        .env("TRAVIS_PULL_REQUEST", "false")
        .env("TRAVIS_REPO_SLUG", "acme/widgets")
        .env("TRAVIS_PULL_REQUEST_SHA", "decafbad")
        .assert()
        .success()
        .stdout(contains("is_ci: true"))
        .stdout(contains("provider: Travis CI"))
        .stdout(contains("is_pr: false"))
        .stdout(contains("pull_request: none"))
        .stdout(contains("repository: acme/widgets"))
        .stdout(contains("commit_sha: decafbad"));
}

#[test]
fn info_json_skips_absent_facts() {
    cmd()
        .args(["info", "--json"])
        .env("DRONE", "true")
        .env("DRONE_PULL_REQUEST", "7")
        .env("DRONE_REPO", "acme/widgets")
        .env("DRONE_COMMIT", "decafbad")
        .assert()
        .success()
        .stdout(contains("\"provider\": \"Drone CI\""))
        .stdout(contains("\"pull_request\": \"7\""));

    cmd()
        .args(["info", "--json"])
        .assert()
        .success()
        .stdout(contains("\"is_ci\": false"))
        .stdout(contains("provider").not());
}

#[test]
fn info_reports_missing_companion_vars() {
    cmd()
        .arg("info")
        .env("TRAVIS", "true")
        .assert()
        .failure()
        .stderr(contains("TRAVIS_REPO_SLUG"));
}

#[test]
fn check_exits_by_detection_state() {
    cmd()
        .arg("check")
        .env("SEMAPHORE", "true")
        .assert()
        .success()
        .stdout(contains("true"));

    cmd().arg("check").assert().failure();
}

#[test]
fn check_pr_requires_a_pull_request_build() {
    cmd()
        .args(["check", "--pr"])
        .env("GITHUB_ACTIONS", "true")
        .env("GITHUB_REF", "refs/pull/42/merge")
        .assert()
        .success();

    cmd()
        .args(["check", "--pr"])
        .env("GITHUB_ACTIONS", "true")
        .assert()
        .failure();
}

#[test]
fn check_quiet_prints_nothing() {
    cmd()
        .args(["check", "--quiet"])
        .env("APPVEYOR", "true")
        .assert()
        .success()
        .stdout("");
}
