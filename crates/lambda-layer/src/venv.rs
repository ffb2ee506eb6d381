// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! Virtual environment creation and activation helpers.

use std::path::{Path, PathBuf};

use crate::Error;
use crate::process::{Invocation, ProcessRunner};

#[cfg(test)]
#[path = "./venv_test.rs"]
mod venv_test;

/// Marker file written by `python -m venv` at the environment root.
pub const PYVENV_CFG: &str = "pyvenv.cfg";

/// Create a virtual environment at `path` using `python -m venv`.
pub async fn provision(
    runner: &ProcessRunner,
    python: &str,
    path: &Path,
    silent: bool,
) -> crate::Result<PathBuf> {
    let invocation = Invocation::exec([
        python.to_string(),
        "-m".to_string(),
        "venv".to_string(),
        path.to_string_lossy().into_owned(),
    ]);

    runner
        .run(&invocation, silent)
        .await
        .map_err(|source| Error::Provision {
            path: path.to_path_buf(),
            source,
        })?;

    if !is_environment(path) {
        return Err(Error::EnvironmentMissing(path.to_path_buf()));
    }

    Ok(path.to_path_buf())
}

/// Whether `path` looks like a usable virtual environment.
pub fn is_environment(path: &Path) -> bool {
    path.is_dir() && path.join(PYVENV_CFG).is_file() && activate_script(path).is_file()
}

/// The POSIX activation script of an environment.
pub fn activate_script(environment: &Path) -> PathBuf {
    environment.join("bin").join("activate")
}

/// Shell step that activates `environment` in the current shell session.
pub(crate) fn activate_step(environment: &Path) -> String {
    format!(". {}", quote_path(&activate_script(environment)))
}

pub(crate) fn quote_path(path: &Path) -> String {
    shell_words::quote(&path.to_string_lossy()).into_owned()
}
