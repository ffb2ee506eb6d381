// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `lambda-layer show` command.

use clap::{Args, ValueEnum};
use colored::Colorize;
use lambda_layer::ConfigFile;
use miette::{IntoDiagnostic, Result};

use crate::ConfigFlags;

/// Output format for `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    #[default]
    Table,
    Yaml,
    Json,
}

/// Display the configured layers
#[derive(Debug, Args)]
pub struct CmdShow {
    #[clap(flatten)]
    config: ConfigFlags,

    /// Output format
    #[clap(long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

impl CmdShow {
    pub async fn run(&mut self) -> Result<i32> {
        let config = self.config.load()?;

        match self.format {
            Format::Table => self.show_table(&config),
            Format::Yaml => print!("{}", serde_yaml::to_string(&config).into_diagnostic()?),
            Format::Json => {
                println!("{}", serde_json::to_string_pretty(&config).into_diagnostic()?)
            }
        }

        Ok(0)
    }

    fn show_table(&self, config: &ConfigFile) {
        if let Some(path) = &config.source_path {
            println!("{} {}", "Configuration:".bold(), path.display().to_string().cyan());
            println!();
        }

        println!("{}", "Layers:".bold());
        println!();

        if config.layers.is_empty() {
            println!("  {}", "(no layers)".dimmed());
        } else {
            for (i, layer) in config.layers.iter().enumerate() {
                println!(
                    "  {}. {} {}",
                    i + 1,
                    layer.name.green(),
                    layer.version.yellow()
                );
                println!("     {}", layer.archive_name().dimmed());
                if layer.packages.is_empty() {
                    println!("     {}", "(no packages)".dimmed());
                }
                for package in &layer.packages {
                    println!("     - {}", package);
                }
            }
        }

        println!();
        println!("Total: {} layer(s)", config.layers.len());

        if !config.env.is_empty() {
            println!();
            println!("{}", "Environment Variables:".bold());
            println!();
            for (name, value) in &config.env {
                println!("  {} = {}", name.cyan(), value.green());
            }
        }
    }
}
