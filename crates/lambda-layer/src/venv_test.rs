// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;
use crate::testing::FakeToolchain;

fn runner() -> ProcessRunner {
    ProcessRunner::new("/bin/sh")
}

#[rstest]
fn test_activate_step_quotes_path() {
    let step = activate_step(Path::new("/tmp/build dir/venv"));
    assert_eq!(step, ". '/tmp/build dir/venv/bin/activate'");
}

#[rstest]
fn test_is_environment_requires_marker_and_activate() {
    let tmp = TempDir::new().unwrap();
    let env = tmp.path().join("venv");
    assert!(!is_environment(&env));

    std::fs::create_dir_all(env.join("bin")).unwrap();
    assert!(!is_environment(&env));

    std::fs::write(env.join(PYVENV_CFG), "home = /usr/bin\n").unwrap();
    assert!(!is_environment(&env));

    std::fs::write(activate_script(&env), "").unwrap();
    assert!(is_environment(&env));
}

#[tokio::test]
async fn test_provision_creates_environment() {
    let toolchain = FakeToolchain::new();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("venv");

    let env = provision(&runner(), &toolchain.python(), &path, true)
        .await
        .expect("Should provision");

    assert_eq!(env, path);
    assert!(is_environment(&env));
    assert_eq!(toolchain.python_invocations(), 1);
}

#[tokio::test]
async fn test_provision_tool_failure() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("venv");

    // `false -m venv PATH` exits 1 without creating anything
    let err = provision(&runner(), "false", &path, true).await.unwrap_err();
    match &err {
        Error::Provision { path: failed, .. } => assert_eq!(failed, &path),
        other => panic!("Expected Provision, got: {:?}", other),
    }
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_provision_without_environment_left_behind() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("venv");

    // `true -m venv PATH` succeeds but creates nothing
    let err = provision(&runner(), "true", &path, true).await.unwrap_err();
    assert!(matches!(err, Error::EnvironmentMissing(_)));
}
