// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! Finding the site-packages directory of a virtual environment.

use std::path::{Path, PathBuf};

use crate::Error;
use crate::process::{Invocation, ProcessRunner};
use crate::venv::activate_step;

#[cfg(test)]
#[path = "./locate_test.rs"]
mod locate_test;

/// Prints the interpreter's site-packages directories as a JSON list.
const SITE_PACKAGES_QUERY: &str = "import json, site; print(json.dumps(site.getsitepackages()))";

/// Compose the shell line that activates `environment` and queries it.
pub fn locate_script(environment: &Path) -> String {
    format!(
        "{} && python -c {}",
        activate_step(environment),
        shell_words::quote(SITE_PACKAGES_QUERY)
    )
}

/// Ask the environment's interpreter where packages were installed.
///
/// When several directories are reported, the first one that exists wins.
pub async fn locate_site_packages(
    runner: &ProcessRunner,
    environment: &Path,
    silent: bool,
) -> crate::Result<PathBuf> {
    let output = runner
        .run(&Invocation::shell(locate_script(environment)), silent)
        .await
        .map_err(|source| Error::Locate {
            environment: environment.to_path_buf(),
            source,
        })?;

    let candidates = parse_site_packages(&output.stdout)?;
    let mut existing = candidates.iter().filter(|path| path.is_dir());
    let Some(chosen) = existing.next() else {
        return Err(Error::LocateParse {
            output: output.stdout,
            reason: "none of the reported directories exist".to_string(),
        });
    };
    for ignored in existing {
        tracing::debug!(path = ?ignored, "ignoring additional site-packages directory");
    }

    tracing::debug!(path = ?chosen, "located site-packages");
    Ok(chosen.clone())
}

/// Parse the output of the site-packages query.
///
/// Only the last non-blank line is considered, since activation scripts may
/// print before the query runs. It must be a non-empty JSON list of strings.
pub fn parse_site_packages(stdout: &str) -> crate::Result<Vec<PathBuf>> {
    let parse_err = |reason: String| Error::LocateParse {
        output: stdout.to_string(),
        reason,
    };

    let line = stdout
        .lines()
        .map(str::trim)
        .rev()
        .find(|line| !line.is_empty())
        .ok_or_else(|| parse_err("the interpreter printed nothing".to_string()))?;

    let dirs: Vec<String> = serde_json::from_str(line)
        .map_err(|e| parse_err(format!("expected a JSON list of paths ({e})")))?;

    if dirs.is_empty() {
        return Err(parse_err(
            "the interpreter reported no site-packages directories".to_string(),
        ));
    }

    Ok(dirs.into_iter().map(PathBuf::from).collect())
}
