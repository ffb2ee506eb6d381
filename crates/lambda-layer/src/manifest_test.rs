// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;

#[rstest]
fn test_one_line_per_package_in_order() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("requirements.txt");

    let written = write_manifest(&path, &["six", "requests>=2.31", "six"]).unwrap();

    assert!(written.is_absolute());
    assert_eq!(
        std::fs::read_to_string(&written).unwrap(),
        "six\nrequests>=2.31\nsix\n"
    );
}

#[rstest]
fn test_empty_packages_creates_empty_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("requirements.txt");

    let written = write_manifest::<_, String>(&path, &[]).unwrap();

    assert!(written.is_file());
    assert_eq!(std::fs::read_to_string(&written).unwrap(), "");
}

#[rstest]
fn test_existing_file_is_appended() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("requirements.txt");
    std::fs::write(&path, "boto3\n").unwrap();

    write_manifest(&path, &["six"]).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "boto3\nsix\n");
}

#[rstest]
fn test_missing_parent_is_manifest_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("missing").join("requirements.txt");

    let err = write_manifest(&path, &["six"]).unwrap_err();
    assert!(matches!(err, Error::Manifest { .. }));
}
