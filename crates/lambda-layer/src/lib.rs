// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! lambda-layer - AWS Lambda Layer Builder
//!
//! This crate provides the core library for turning a declared list of Python
//! packages into a Lambda layer archive.
//!
//! # Overview
//!
//! A build provisions a throwaway virtual environment, installs the requested
//! packages into it with pip, asks the environment's interpreter where its
//! site-packages directory is, and zips that directory under the `python/`
//! prefix that the Lambda Python runtimes add to `sys.path`. The finished
//! `{name}-{version}.zip` is copied into the output directory and every
//! intermediate file is removed.
//!
//! # Example
//!
//! ```toml
//! # .lambda-layer.toml
//!
//! # Passed to every external command
//! [env]
//! PIP_INDEX_URL = "https://pypi.org/simple"
//!
//! [[layers]]
//! name = "utils"
//! version = "1.0.0"
//! packages = ["six", "requests>=2.31"]
//! ```

pub mod archive;
pub mod build;
pub mod config;
pub mod env;
pub mod error;
pub mod install;
pub mod locate;
pub mod manifest;
pub mod process;
pub mod venv;

#[cfg(test)]
mod testing;

pub use archive::archive;
pub use build::{BuildOptions, LayerArtifact, LayerBuilder};
pub use config::{ConfigFile, LayerDefinition};
pub use env::{expand_path, Var};
pub use error::{Error, ProcessError, Result};
pub use install::install;
pub use locate::{locate_site_packages, parse_site_packages};
pub use manifest::write_manifest;
pub use process::{Invocation, ProcessOutput, ProcessRunner};
pub use tokio_util::sync::CancellationToken;
pub use venv::provision;

/// Well-known filename for layer configuration.
pub const CONFIG_FILENAME: &str = ".lambda-layer.toml";

/// Default directory, relative to the working directory, for finished archives.
pub const DEFAULT_DIST_DIR: &str = "dist";

/// Extension of the layer archives.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Directory inside the archive that the Lambda Python runtimes put on `sys.path`.
pub const DEFAULT_ROOT_PREFIX: &str = "python";

/// Shell used for commands that must run inside an activated environment.
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Interpreter used to create virtual environments.
pub const DEFAULT_PYTHON: &str = "python3";
