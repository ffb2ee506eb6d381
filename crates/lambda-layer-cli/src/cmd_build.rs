// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `lambda-layer build` command.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use colored::Colorize;
use lambda_layer::{BuildOptions, CancellationToken, LayerArtifact, LayerBuilder, Var};
use miette::Result;

use crate::ConfigFlags;

#[cfg(test)]
#[path = "./cmd_build_test.rs"]
mod cmd_build_test;

/// Build layer archives
#[derive(Debug, Args)]
pub struct CmdBuild {
    #[clap(flatten)]
    config: ConfigFlags,

    /// Directory receiving the archives [default: ./dist, or $LAMBDA_LAYER_DIST_DIR]
    #[clap(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Only build the named layer (repeatable)
    #[clap(short = 'l', long = "layer")]
    layers: Vec<String>,

    /// Only echo commands and their output when something fails
    #[clap(long)]
    silent: bool,

    /// Skip upgrading pip before installing
    #[clap(long)]
    no_upgrade_pip: bool,

    /// Kill any external command running longer than SECS
    #[clap(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Shell for commands run in the environment [default: /bin/bash, or $LAMBDA_LAYER_SHELL]
    #[clap(long)]
    shell: Option<PathBuf>,

    /// Interpreter creating the environment [default: python3, or $LAMBDA_LAYER_PYTHON]
    #[clap(long)]
    python: Option<String>,
}

impl CmdBuild {
    pub async fn run(&mut self) -> Result<i32> {
        let config = self.config.load()?;
        let layers = config.select(self.layers.as_slice())?;
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(Var::DistDir.get()));

        let options = self.options(config.env.clone());
        let token = CancellationToken::new();
        let builder = LayerBuilder::new(options).with_cancellation(token.clone());

        let interrupt = tokio::spawn({
            let token = token.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupted, cancelling build");
                    token.cancel();
                }
            }
        });

        let mut artifacts = Vec::with_capacity(layers.len());
        let mut failure = None;
        for layer in layers {
            match builder.build(&output, layer).await {
                Ok(artifact) => artifacts.push(artifact),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        interrupt.abort();

        for artifact in &artifacts {
            print_artifact(artifact);
        }

        match failure {
            None => Ok(0),
            Some(err) => {
                let code = err.exit_code();
                eprintln!("{:?}", miette::Report::new(err));
                Ok(code)
            }
        }
    }

    fn options(&self, env: BTreeMap<String, String>) -> BuildOptions {
        BuildOptions {
            shell: self
                .shell
                .clone()
                .unwrap_or_else(|| PathBuf::from(Var::Shell.get())),
            python: self.python.clone().unwrap_or_else(|| Var::Python.get()),
            upgrade_pip: !self.no_upgrade_pip,
            silent: self.silent,
            timeout: self.timeout.map(Duration::from_secs),
            env,
            ..Default::default()
        }
    }
}

fn print_artifact(artifact: &LayerArtifact) {
    println!(
        "{} {} ({} bytes)",
        "Built".green().bold(),
        artifact.path.display(),
        artifact.size
    );
    println!("  sha256 {}", artifact.sha256.dimmed());
}
