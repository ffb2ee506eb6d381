// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use super::*;

#[derive(Parser)]
struct Wrapper {
    #[clap(flatten)]
    cmd: CmdBuild,
}

fn parse(args: &[&str]) -> CmdBuild {
    Wrapper::parse_from(std::iter::once("build").chain(args.iter().copied())).cmd
}

#[rstest]
fn test_options_from_flags() {
    let cmd = parse(&[
        "--silent",
        "--no-upgrade-pip",
        "--timeout",
        "30",
        "--shell",
        "/bin/sh",
        "--python",
        "python3.12",
    ]);
    let env = BTreeMap::from([("PIP_NO_CACHE_DIR".to_string(), "1".to_string())]);

    let options = cmd.options(env.clone());

    assert_eq!(
        options,
        BuildOptions {
            shell: PathBuf::from("/bin/sh"),
            python: "python3.12".to_string(),
            upgrade_pip: false,
            silent: true,
            timeout: Some(Duration::from_secs(30)),
            env,
            ..Default::default()
        }
    );
}

#[rstest]
fn test_options_fall_back_to_environment() {
    let options = parse(&[]).options(BTreeMap::new());

    assert_eq!(options.shell, PathBuf::from(Var::Shell.get()));
    assert_eq!(options.python, Var::Python.get());
    assert!(options.upgrade_pip);
    assert!(!options.silent);
    assert_eq!(options.timeout, None);
    assert_eq!(options.root_prefix, "python");
}

#[rstest]
fn test_layer_flag_repeats() {
    let cmd = parse(&["-l", "utils", "--layer", "numpy", "-o", "out"]);
    assert_eq!(cmd.layers, vec!["utils", "numpy"]);
    assert_eq!(cmd.output, Some(PathBuf::from("out")));
}

#[tokio::test]
async fn test_missing_config_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("missing.toml").display().to_string();

    assert!(parse(&["-c", config.as_str()]).run().await.is_err());
}

#[tokio::test]
async fn test_unknown_layer_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join(lambda_layer::CONFIG_FILENAME);
    std::fs::write(
        &config,
        "[[layers]]\nname = \"utils\"\nversion = \"1.0.0\"\npackages = [\"six\"]\n",
    )
    .unwrap();
    let config = config.display().to_string();

    let err = parse(&["-c", config.as_str(), "-l", "numpy"])
        .run()
        .await
        .unwrap_err();
    assert!(format!("{err:?}").contains("numpy"));
}
