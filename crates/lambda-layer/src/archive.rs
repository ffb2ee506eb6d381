// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! Zipping an install tree under the layer root prefix.

use std::borrow::Cow;
use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::Error;

#[cfg(test)]
#[path = "./archive_test.rs"]
mod archive_test;

/// Zip every regular file under `source_dir` into `dest`.
///
/// Each file is stored as `root_prefix/<path relative to source_dir>`.
/// Symlinks are not followed and directories get no entries of their own.
pub fn archive<P, Q>(source_dir: P, dest: Q, root_prefix: &str) -> crate::Result<PathBuf>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let source_dir = source_dir.as_ref();
    let dest = dest.as_ref();
    let archive_err = |path: &Path, source: io::Error| Error::Archive {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(dest).map_err(|e| archive_err(dest, e))?;
    let mut zip = ZipWriter::new(file);
    let mut entries = 0usize;

    for entry in WalkDir::new(source_dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| archive_err(source_dir, e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(source_dir).unwrap_or(path);
        let name = entry_name(root_prefix, relative);
        let options = file_options(&entry).map_err(|e| archive_err(path, e))?;

        zip.start_file(name, options)
            .map_err(|e| archive_err(dest, io::Error::other(e)))?;
        let mut input = File::open(path).map_err(|e| archive_err(path, e))?;
        io::copy(&mut input, &mut zip).map_err(|e| archive_err(path, e))?;
        entries += 1;
    }

    zip.finish()
        .map_err(|e| archive_err(dest, io::Error::other(e)))?;

    tracing::debug!(source = ?source_dir, archive = ?dest, entries, "wrote layer archive");
    Ok(dest.to_path_buf())
}

/// Archive entry name for a file, always `/`-separated.
pub fn entry_name(root_prefix: &str, relative: &Path) -> String {
    let prefix = root_prefix.split('/').filter(|part| !part.is_empty());
    let rest = relative.components().filter_map(|component| match component {
        Component::Normal(part) => Some(part.to_string_lossy()),
        _ => None,
    });
    prefix
        .map(Cow::Borrowed)
        .chain(rest)
        .collect::<Vec<_>>()
        .join("/")
}

fn file_options(entry: &DirEntry) -> io::Result<FileOptions> {
    let metadata = entry.metadata().map_err(io::Error::from)?;
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(metadata.len() >= u64::from(u32::MAX));

    #[cfg(unix)]
    let options = {
        use std::os::unix::fs::PermissionsExt;
        options.unix_permissions(metadata.permissions().mode())
    };

    Ok(options)
}
