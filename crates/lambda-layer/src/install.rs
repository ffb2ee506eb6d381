// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! Installing requirements into a virtual environment with pip.

use std::path::Path;

use crate::Error;
use crate::process::{Invocation, ProcessRunner};
use crate::venv::{activate_step, quote_path};

#[cfg(test)]
#[path = "./install_test.rs"]
mod install_test;

/// Compose the shell line that activates `environment` and runs pip.
///
/// Activation only affects the shell it runs in, so every step has to share
/// a single shell invocation.
pub fn install_script(environment: &Path, manifest: &Path, upgrade_pip: bool) -> String {
    let mut steps = vec![activate_step(environment)];
    if upgrade_pip {
        steps.push("pip3 install --upgrade pip".to_string());
    }
    steps.push(format!("pip3 install -r {}", quote_path(manifest)));
    steps.join(" && ")
}

/// Install the requirements listed in `manifest` into `environment`.
pub async fn install(
    runner: &ProcessRunner,
    environment: &Path,
    manifest: &Path,
    upgrade_pip: bool,
    silent: bool,
) -> crate::Result<()> {
    let script = install_script(environment, manifest, upgrade_pip);
    runner
        .run(&Invocation::shell(script), silent)
        .await
        .map_err(|source| Error::Install {
            manifest: manifest.to_path_buf(),
            source,
        })?;
    Ok(())
}
