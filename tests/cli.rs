use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("euroind").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("euroind"));
}

#[test]
fn countries_lists_dialects() {
    let mut cmd = Command::cargo_bin("euroind").unwrap();
    cmd.arg("countries");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Greece"))
        .stdout(predicate::str::contains("eurostat=EL"))
        .stdout(predicate::str::contains("worldbank=GRC"));
}

#[test]
fn unknown_country_code_fails() {
    let mut cmd = Command::cargo_bin("euroind").unwrap();
    cmd.args(["profile", "ZZ"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown country code"));
}

#[test]
fn unknown_indicator_fails() {
    let mut cmd = Command::cargo_bin("euroind").unwrap();
    cmd.args(["overlay", "happiness"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown indicator"));
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn profile_online_germany() {
    let mut cmd = Command::cargo_bin("euroind").unwrap();
    cmd.args(["profile", "DE"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Germany"));
}
