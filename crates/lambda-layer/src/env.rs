// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! Environment variables that override tool paths and default locations.

use std::path::{Path, PathBuf};

use crate::{CONFIG_FILENAME, DEFAULT_DIST_DIR, DEFAULT_PYTHON, DEFAULT_SHELL, Error};

#[cfg(test)]
#[path = "./env_test.rs"]
mod env_test;

/// A recognized environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Var {
    /// Path of the layer configuration file.
    ConfigPath,
    /// Directory receiving finished archives.
    DistDir,
    /// Shell used for commands run inside an activated environment.
    Shell,
    /// Interpreter used to create virtual environments.
    Python,
}

impl Var {
    pub const ALL: [Var; 4] = [Var::ConfigPath, Var::DistDir, Var::Shell, Var::Python];

    pub fn name(self) -> &'static str {
        match self {
            Var::ConfigPath => "LAMBDA_LAYER_CONFIG",
            Var::DistDir => "LAMBDA_LAYER_DIST_DIR",
            Var::Shell => "LAMBDA_LAYER_SHELL",
            Var::Python => "LAMBDA_LAYER_PYTHON",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Var::ConfigPath => "The path to the layer configuration file.",
            Var::DistDir => "The directory that receives finished layer archives.",
            Var::Shell => "The shell used to run commands inside the virtual environment.",
            Var::Python => "The Python interpreter used to create virtual environments.",
        }
    }

    /// Value used when the variable is unset or empty.
    pub fn default_value(self) -> String {
        match self {
            Var::ConfigPath => working_dir().join(CONFIG_FILENAME).display().to_string(),
            Var::DistDir => working_dir().join(DEFAULT_DIST_DIR).display().to_string(),
            Var::Shell => DEFAULT_SHELL.to_string(),
            Var::Python => DEFAULT_PYTHON.to_string(),
        }
    }

    /// Read the variable from the process environment, falling back to the default.
    pub fn get(self) -> String {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve the variable through `lookup` instead of the process environment.
    pub fn resolve_with<F>(self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(self.name())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.default_value())
    }
}

fn working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_default()
}

/// Expand a leading `~` and make the path absolute against the working directory.
pub fn expand_path(path: &Path) -> crate::Result<PathBuf> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir().ok_or_else(|| {
                Error::ValidationFailed("Cannot resolve ~ without HOME".to_string())
            })?;
            home.join(rest)
        }
        Err(_) => path.to_path_buf(),
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(std::env::current_dir()?.join(expanded))
    }
}
