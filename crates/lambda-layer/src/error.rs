// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for lambda-layer operations.

use std::path::PathBuf;
use std::time::Duration;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Convenience Result type with lambda-layer Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Exit code reported when an external command was cut off by the timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code reported when an external command could not be started.
pub const SPAWN_EXIT_CODE: i32 = 127;

/// Exit code reported when a build was cancelled.
pub const CANCELLED_EXIT_CODE: i32 = 130;

/// Errors that can occur while loading configuration or building a layer.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Configuration file does not exist
    #[error("Layer configuration not found at {0:?}")]
    #[diagnostic(
        code(lambda_layer::config_not_found),
        help("Create one with 'lambda-layer init' or point LAMBDA_LAYER_CONFIG at an existing file")
    )]
    ConfigNotFound(PathBuf),

    /// Configuration path names a directory
    #[error("Layer configuration path is a directory: {0:?}")]
    #[diagnostic(code(lambda_layer::config_is_directory))]
    ConfigIsDirectory(PathBuf),

    /// Failed to read file
    #[error("Failed to read file: {path:?}")]
    #[diagnostic(code(lambda_layer::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Invalid TOML in the configuration file
    #[error("Invalid layer configuration: {message}")]
    #[diagnostic(
        code(lambda_layer::invalid_toml),
        help("Each [[layers]] table needs a 'name' and a 'version'; 'packages' is a list of strings")
    )]
    InvalidToml {
        message: String,
        #[source_code]
        source_code: NamedSource<String>,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    /// Validation error
    #[error("Validation failed: {0}")]
    #[diagnostic(code(lambda_layer::validation_failed))]
    ValidationFailed(String),

    /// Requested layer is not defined
    #[error("Unknown layer: {name}")]
    #[diagnostic(code(lambda_layer::unknown_layer), help("{}", suggestion_message(known)))]
    UnknownLayer { name: String, known: Vec<String> },

    /// Output path exists and is not a directory
    #[error("{0:?} is not a directory")]
    #[diagnostic(
        code(lambda_layer::not_a_directory),
        help("Choose another output directory or remove the file")
    )]
    NotADirectory(PathBuf),

    /// Virtual environment creation failed
    #[error("Failed to create virtual environment at {path:?}")]
    #[diagnostic(code(lambda_layer::provision))]
    Provision {
        path: PathBuf,
        #[source]
        source: ProcessError,
    },

    /// Environment tool succeeded but left no usable environment behind
    #[error("No virtual environment was created at {0:?}")]
    #[diagnostic(
        code(lambda_layer::provision),
        help("Check that the interpreter ships the 'venv' module (e.g. install python3-venv)")
    )]
    EnvironmentMissing(PathBuf),

    /// Failed to write the requirements manifest
    #[error("Failed to write requirements to {path:?}")]
    #[diagnostic(code(lambda_layer::manifest))]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// pip failed
    #[error("Failed to install requirements from {manifest:?}")]
    #[diagnostic(
        code(lambda_layer::install),
        help("pip's own output above describes what went wrong")
    )]
    Install {
        manifest: PathBuf,
        #[source]
        source: ProcessError,
    },

    /// Site-packages query failed
    #[error("Failed to query site-packages of {environment:?}")]
    #[diagnostic(code(lambda_layer::locate))]
    Locate {
        environment: PathBuf,
        #[source]
        source: ProcessError,
    },

    /// Site-packages query produced something unusable
    #[error("Could not determine site-packages: {reason}")]
    #[diagnostic(code(lambda_layer::locate))]
    LocateParse { output: String, reason: String },

    /// Walking the install tree or writing the zip failed
    #[error("Failed to archive {path:?}")]
    #[diagnostic(code(lambda_layer::archive))]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Copying the archive into the output directory failed
    #[error("Failed to copy {from:?} to {to:?}")]
    #[diagnostic(code(lambda_layer::copy))]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The build was cancelled between stages
    #[error("Build cancelled")]
    #[diagnostic(code(lambda_layer::cancelled))]
    Cancelled,

    /// IO error passthrough
    #[error(transparent)]
    #[diagnostic(code(lambda_layer::io_error))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The process exit code a command line front-end should report.
    ///
    /// Failures of external tools carry the tool's own exit code through.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Provision { source, .. }
            | Error::Install { source, .. }
            | Error::Locate { source, .. } => source.exit_code(),
            Error::Cancelled => CANCELLED_EXIT_CODE,
            _ => 1,
        }
    }
}

/// Errors from running a single external command.
#[derive(Error, Diagnostic, Debug)]
pub enum ProcessError {
    /// Nothing to execute
    #[error("Cannot run an empty command")]
    #[diagnostic(code(lambda_layer::process::empty))]
    EmptyCommand,

    /// The program could not be started
    #[error("Failed to start {program}")]
    #[diagnostic(
        code(lambda_layer::process::spawn),
        help("Check that {program} is installed and on PATH")
    )]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading output or waiting for exit failed
    #[error("Failed while waiting for: {command}")]
    #[diagnostic(code(lambda_layer::process::wait))]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program exited unsuccessfully
    #[error("Command failed (exit code {code}): {command}")]
    #[diagnostic(code(lambda_layer::process::failed))]
    Failed {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    /// The program ran past the configured timeout and was killed
    #[error("Command timed out after {timeout:?}: {command}")]
    #[diagnostic(code(lambda_layer::process::timeout))]
    TimedOut { command: String, timeout: Duration },

    /// The program was killed because the build was cancelled
    #[error("Command cancelled: {command}")]
    #[diagnostic(code(lambda_layer::process::cancelled))]
    Cancelled { command: String },
}

impl ProcessError {
    /// The exit code that best represents this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProcessError::Failed { code, .. } => *code,
            ProcessError::Spawn { .. } => SPAWN_EXIT_CODE,
            ProcessError::TimedOut { .. } => TIMEOUT_EXIT_CODE,
            ProcessError::Cancelled { .. } => CANCELLED_EXIT_CODE,
            _ => 1,
        }
    }
}

fn suggestion_message(known: &[String]) -> String {
    if known.is_empty() {
        "No layers are defined in the configuration".to_string()
    } else {
        format!("Known layers: {}", known.join(", "))
    }
}
