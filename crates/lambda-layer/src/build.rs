// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! The layer build pipeline.
//!
//! A build runs in its own scratch directory:
//!
//! 1. provision a virtual environment
//! 2. write the requirements manifest
//! 3. install the requirements with pip
//! 4. locate the environment's site-packages
//! 5. zip site-packages under the root prefix
//! 6. copy the archive into the output directory
//!
//! The scratch directory is removed when the build ends, whatever the outcome.

use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::config::LayerDefinition;
use crate::process::ProcessRunner;
use crate::{
    DEFAULT_PYTHON, DEFAULT_ROOT_PREFIX, DEFAULT_SHELL, Error, archive, expand_path, install,
    locate_site_packages, provision, write_manifest,
};

#[cfg(test)]
#[path = "./build_test.rs"]
mod build_test;

/// Knobs shared by every build run with one [`LayerBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Shell used for steps that run inside the activated environment.
    pub shell: PathBuf,
    /// Interpreter used to create the environment.
    pub python: String,
    /// Upgrade pip before installing the requirements.
    pub upgrade_pip: bool,
    /// Only echo commands and output when something fails.
    pub silent: bool,
    /// Kill any single external command that runs longer than this.
    pub timeout: Option<Duration>,
    /// Directory inside the archive that holds the installed packages.
    pub root_prefix: String,
    /// Extra environment variables for every external command.
    pub env: BTreeMap<String, String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            shell: PathBuf::from(DEFAULT_SHELL),
            python: DEFAULT_PYTHON.to_string(),
            upgrade_pip: true,
            silent: false,
            timeout: None,
            root_prefix: DEFAULT_ROOT_PREFIX.to_string(),
            env: BTreeMap::new(),
        }
    }
}

/// A finished layer archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerArtifact {
    /// Location of the archive in the output directory.
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the archive.
    pub sha256: String,
    /// Size of the archive in bytes.
    pub size: u64,
}

/// Builds layer archives.
#[derive(Debug, Clone, Default)]
pub struct LayerBuilder {
    options: BuildOptions,
    cancel: CancellationToken,
}

impl LayerBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop between stages, and kill the running command, once `token` is
    /// cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Build `layer` into `output_dir/{name}-{version}.zip`.
    pub async fn build<P: AsRef<Path>>(
        &self,
        output_dir: P,
        layer: &LayerDefinition,
    ) -> crate::Result<LayerArtifact> {
        layer.validate()?;
        let output_dir = prepare_output_dir(output_dir.as_ref())?;
        self.checkpoint()?;

        tracing::info!(
            layer = %layer.name,
            version = %layer.version,
            packages = layer.packages.len(),
            "building layer"
        );

        let context = BuildContext::new(layer)?;
        let result = self.run_pipeline(&context, &output_dir, layer).await;
        context.close();

        if let Ok(artifact) = &result {
            tracing::info!(path = ?artifact.path, size = artifact.size, "layer built");
        }
        result
    }

    async fn run_pipeline(
        &self,
        context: &BuildContext,
        output_dir: &Path,
        layer: &LayerDefinition,
    ) -> crate::Result<LayerArtifact> {
        let runner = self.runner();
        let silent = self.options.silent;

        self.checkpoint()?;
        tracing::info!(path = ?context.environment, "provisioning virtual environment");
        let environment =
            provision(&runner, &self.options.python, &context.environment, silent).await?;

        self.checkpoint()?;
        tracing::info!(path = ?context.manifest, "writing requirements");
        let manifest = write_manifest(&context.manifest, &layer.packages)?;

        self.checkpoint()?;
        tracing::info!("installing requirements");
        install(
            &runner,
            &environment,
            &manifest,
            self.options.upgrade_pip,
            silent,
        )
        .await?;

        self.checkpoint()?;
        tracing::info!("locating site-packages");
        let site_packages = locate_site_packages(&runner, &environment, silent).await?;

        self.checkpoint()?;
        tracing::info!(source = ?site_packages, "archiving");
        let archive_path = archive(&site_packages, &context.archive, &self.options.root_prefix)?;

        self.checkpoint()?;
        let target = output_dir.join(layer.archive_name());
        if !silent {
            eprintln!("Copying {} to {}", archive_path.display(), target.display());
        }
        copy_into_place(&archive_path, &target)?;

        describe_artifact(target)
    }

    fn runner(&self) -> ProcessRunner {
        ProcessRunner::new(&self.options.shell)
            .with_timeout(self.options.timeout)
            .with_env(self.options.env.clone())
            .with_cancellation(self.cancel.clone())
    }

    fn checkpoint(&self) -> crate::Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// Scratch space for a single build.
struct BuildContext {
    scratch: TempDir,
    environment: PathBuf,
    manifest: PathBuf,
    archive: PathBuf,
}

impl BuildContext {
    fn new(layer: &LayerDefinition) -> crate::Result<Self> {
        let scratch = tempfile::Builder::new().prefix("lambda-layer-").tempdir()?;
        // venv and pip both resolve symlinks, keep every path canonical
        let root = dunce::canonicalize(scratch.path())?;
        tracing::debug!(path = ?root, "created scratch directory");
        Ok(Self {
            environment: root.join("venv"),
            manifest: root.join("requirements.txt"),
            archive: root.join(layer.archive_name()),
            scratch,
        })
    }

    fn close(self) {
        let path = self.scratch.path().to_path_buf();
        match self.scratch.close() {
            Ok(()) => tracing::debug!(path = ?path, "removed scratch directory"),
            Err(err) => {
                tracing::warn!(path = ?path, error = %err, "failed to remove scratch directory")
            }
        }
    }
}

fn prepare_output_dir(output_dir: &Path) -> crate::Result<PathBuf> {
    let output_dir = expand_path(output_dir)?;
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(Error::NotADirectory(output_dir));
    }
    std::fs::create_dir_all(&output_dir)?;
    Ok(output_dir)
}

/// Copy `from` to `to` through a hidden sibling so `to` never holds a
/// partial archive.
fn copy_into_place(from: &Path, to: &Path) -> crate::Result<()> {
    let copy_err = |source| Error::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    let file_name = to
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let partial = to.with_file_name(format!(".{file_name}.partial"));

    let copied = std::fs::copy(from, &partial).and_then(|_| std::fs::rename(&partial, to));
    if let Err(err) = copied {
        match std::fs::remove_file(&partial) {
            Err(cleanup) if cleanup.kind() != io::ErrorKind::NotFound => {
                tracing::warn!(path = ?partial, error = %cleanup, "failed to remove partial copy");
            }
            _ => {}
        }
        return Err(copy_err(err));
    }
    Ok(())
}

fn describe_artifact(path: PathBuf) -> crate::Result<LayerArtifact> {
    let mut file = File::open(&path)?;
    let mut hasher = Sha256::new();
    let size = io::copy(&mut file, &mut hasher)?;
    Ok(LayerArtifact {
        sha256: format!("{:x}", hasher.finalize()),
        size,
        path,
    })
}
