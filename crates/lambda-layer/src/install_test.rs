// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;
use crate::testing::{FakeToolchain, site_packages};
use crate::{provision, write_manifest};

#[rstest]
#[case::with_upgrade(
    true,
    ". /tmp/b/venv/bin/activate && pip3 install --upgrade pip && pip3 install -r /tmp/b/requirements.txt"
)]
#[case::without_upgrade(
    false,
    ". /tmp/b/venv/bin/activate && pip3 install -r /tmp/b/requirements.txt"
)]
fn test_install_script(#[case] upgrade_pip: bool, #[case] expected: &str) {
    let script = install_script(
        Path::new("/tmp/b/venv"),
        Path::new("/tmp/b/requirements.txt"),
        upgrade_pip,
    );
    assert_eq!(script, expected);
}

#[rstest]
fn test_install_script_quotes_paths() {
    let script = install_script(
        Path::new("/tmp/my build/venv"),
        Path::new("/tmp/my build/requirements.txt"),
        false,
    );
    assert_eq!(
        script,
        ". '/tmp/my build/venv/bin/activate' && pip3 install -r '/tmp/my build/requirements.txt'"
    );
}

#[tokio::test]
async fn test_install_into_environment() {
    let toolchain = FakeToolchain::new();
    let tmp = TempDir::new().unwrap();
    let runner = ProcessRunner::new("/bin/sh");

    let env = provision(&runner, &toolchain.python(), &tmp.path().join("venv"), true)
        .await
        .unwrap();
    let manifest = write_manifest(tmp.path().join("requirements.txt"), &["six", "attrs"]).unwrap();

    install(&runner, &env, &manifest, true, true).await.unwrap();

    let site = site_packages(&env);
    assert!(site.join("six").join("__init__.py").is_file());
    assert!(site.join("attrs").join("__init__.py").is_file());
}

#[tokio::test]
async fn test_install_failure_is_install_error() {
    let toolchain = FakeToolchain::new();
    let tmp = TempDir::new().unwrap();
    let runner = ProcessRunner::new("/bin/sh");

    let env = provision(&runner, &toolchain.python(), &tmp.path().join("venv"), true)
        .await
        .unwrap();
    let manifest =
        write_manifest(tmp.path().join("requirements.txt"), &["not a valid spec!!"]).unwrap();

    let err = install(&runner, &env, &manifest, false, true)
        .await
        .unwrap_err();
    match &err {
        Error::Install { manifest: failed, .. } => assert_eq!(failed, &manifest),
        other => panic!("Expected Install, got: {:?}", other),
    }
    assert_eq!(err.exit_code(), 1);
}
