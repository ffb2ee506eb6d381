// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file parsing and data types for .lambda-layer.toml files.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use miette::{NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};

use crate::{ARCHIVE_EXTENSION, Error};

#[cfg(test)]
#[path = "./config_test.rs"]
mod config_test;

/// A single layer to build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LayerDefinition {
    /// Layer name, used as the first half of the archive filename.
    pub name: String,

    /// Layer version, used as the second half of the archive filename.
    pub version: String,

    /// Requirement specifiers handed to pip, in order.
    #[serde(default)]
    pub packages: Vec<String>,
}

impl LayerDefinition {
    pub fn new<N, V, I, S>(name: N, version: V, packages: I) -> Self
    where
        N: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            version: version.into(),
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }

    /// Filename of the archive this layer builds into.
    pub fn archive_name(&self) -> String {
        format!("{}-{}.{}", self.name, self.version, ARCHIVE_EXTENSION)
    }

    /// Check that the name and version can safely form a filename.
    pub fn validate(&self) -> crate::Result<()> {
        validate_component("name", &self.name)?;
        validate_component("version", &self.version)
    }
}

fn validate_component(field: &str, value: &str) -> crate::Result<()> {
    if value.trim().is_empty() {
        return Err(Error::ValidationFailed(format!(
            "layer {field} must not be empty"
        )));
    }
    if value == "." || value == ".." || value.contains(|c| c == '/' || c == '\\') {
        return Err(Error::ValidationFailed(format!(
            "layer {field} '{value}' cannot be used in a filename"
        )));
    }
    Ok(())
}

/// Contents of a .lambda-layer.toml file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfigFile {
    /// Environment variables set for every external command.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Layers in declaration order.
    #[serde(default)]
    pub layers: Vec<LayerDefinition>,

    /// Path to the file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl ConfigFile {
    /// Parse config from a TOML string.
    pub fn from_toml<S: Into<String>>(toml: S) -> crate::Result<Self> {
        Self::parse("<inline>", toml.into())
    }

    /// Load config from file path.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = crate::env::expand_path(path.as_ref())?;
        if !path.exists() {
            return Err(Error::ConfigNotFound(path));
        }
        if path.is_dir() {
            return Err(Error::ConfigIsDirectory(path));
        }

        let text = std::fs::read_to_string(&path).map_err(|error| Error::ReadFailed {
            path: path.clone(),
            error,
        })?;

        let mut config = Self::parse(&path.display().to_string(), text)?;
        config.source_path = Some(path);
        Ok(config)
    }

    fn parse(name: &str, text: String) -> crate::Result<Self> {
        let config: Self = match toml::from_str(&text) {
            Ok(config) => config,
            Err(error) => {
                return Err(Error::InvalidToml {
                    message: error.message().to_string(),
                    span: error.span().map(SourceSpan::from),
                    source_code: NamedSource::new(name, text),
                });
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate every layer and reject repeated name/version pairs.
    pub fn validate(&self) -> crate::Result<()> {
        let mut seen = HashSet::new();
        for layer in &self.layers {
            layer.validate()?;
            if !seen.insert((layer.name.as_str(), layer.version.as_str())) {
                return Err(Error::ValidationFailed(format!(
                    "layer '{}' version '{}' is defined more than once",
                    layer.name, layer.version
                )));
            }
        }
        Ok(())
    }

    /// Find the first layer with the given name.
    pub fn layer(&self, name: &str) -> Option<&LayerDefinition> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Pick the named layers, or every layer when no names are given.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> crate::Result<Vec<&LayerDefinition>> {
        if names.is_empty() {
            return Ok(self.layers.iter().collect());
        }

        let mut selected = Vec::new();
        for name in names {
            let name = name.as_ref();
            let matching: Vec<_> = self
                .layers
                .iter()
                .filter(|layer| layer.name == name)
                .collect();
            if matching.is_empty() {
                return Err(Error::UnknownLayer {
                    name: name.to_string(),
                    known: self.layers.iter().map(|l| l.name.clone()).collect(),
                });
            }
            selected.extend(matching);
        }
        Ok(selected)
    }
}
