// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! Requirements manifest handed to pip.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::Error;

#[cfg(test)]
#[path = "./manifest_test.rs"]
mod manifest_test;

/// Append one requirement per line to the file at `path`.
///
/// The file is created if needed and appended to otherwise, so callers pass a
/// fresh path for each build. Packages are written verbatim and in order.
/// Returns the canonical path of the manifest.
pub fn write_manifest<P, S>(path: P, packages: &[S]) -> crate::Result<PathBuf>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    let manifest_err = |source| Error::Manifest {
        path: path.to_path_buf(),
        source,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(manifest_err)?;

    let mut writer = BufWriter::new(file);
    for package in packages {
        writeln!(writer, "{}", package.as_ref()).map_err(manifest_err)?;
    }
    writer.flush().map_err(manifest_err)?;

    tracing::debug!(path = ?path, count = packages.len(), "wrote requirements");
    dunce::canonicalize(path).map_err(manifest_err)
}
