// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `lambda-layer init` command.

use std::path::PathBuf;

use clap::Args;
use lambda_layer::{ConfigFile, LayerDefinition};
use miette::{IntoDiagnostic, Result};

#[cfg(test)]
#[path = "./cmd_init_test.rs"]
mod cmd_init_test;

/// Create a new .lambda-layer.toml file
#[derive(Debug, Args)]
pub struct CmdInit {
    /// Directory to create file in
    #[clap(default_value = ".")]
    path: PathBuf,

    /// Name of the initial layer
    #[clap(long = "layer", default_value = "layer")]
    name: String,

    /// Version of the initial layer
    #[clap(long = "version", default_value = "0.1.0")]
    version: String,

    /// Package to put in the initial layer (repeatable)
    #[clap(long = "package")]
    packages: Vec<String>,
}

impl CmdInit {
    pub async fn run(&mut self) -> Result<i32> {
        let config_path = self.path.join(lambda_layer::CONFIG_FILENAME);

        if config_path.exists() {
            return Err(miette::miette!(
                "{} already exists at {:?}",
                lambda_layer::CONFIG_FILENAME,
                config_path
            ));
        }

        let content = self.render()?;
        std::fs::write(&config_path, content).map_err(|e| {
            miette::miette!(
                "Failed to write {}: {}",
                lambda_layer::CONFIG_FILENAME,
                e
            )
        })?;

        println!("Created {} at {:?}", lambda_layer::CONFIG_FILENAME, config_path);
        println!();
        println!("Next steps:");
        println!("  1. Edit the file to list the packages of each layer");
        println!("  2. Run 'lambda-layer show' to check the configuration");
        println!("  3. Run 'lambda-layer build' to build the archives");

        Ok(0)
    }

    /// Starter configuration holding a single layer.
    fn render(&self) -> Result<String> {
        let config = ConfigFile {
            layers: vec![LayerDefinition::new(
                self.name.as_str(),
                self.version.as_str(),
                self.packages.iter().map(String::as_str),
            )],
            ..Default::default()
        };
        config.validate()?;

        let body = toml::to_string(&config).into_diagnostic()?;
        Ok(format!(
            "# lambda-layer configuration\n\
            #\n\
            # Each [[layers]] table builds into {{name}}-{{version}}.zip.\n\
            # Variables under [env] are passed to python and pip, e.g.\n\
            # [env]\n\
            # PIP_INDEX_URL = \"https://pypi.org/simple\"\n\
            \n\
            {body}"
        ))
    }
}
