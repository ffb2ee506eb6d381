// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! lambda-layer - AWS Lambda Layer Builder CLI

use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use lambda_layer::Var;
use miette::Result;

mod cmd_build;
mod cmd_init;
mod cmd_show;

use cmd_build::CmdBuild;
use cmd_init::CmdInit;
use cmd_show::CmdShow;

#[derive(Parser)]
#[clap(
    name = "lambda-layer",
    about = "AWS Lambda Layer Builder",
    version,
    long_about = "Build AWS Lambda layer archives from Python packages declared in .lambda-layer.toml"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

impl Logging {
    fn level(&self) -> tracing::Level {
        match (self.quiet, self.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        }
    }
}

/// Location of the layer configuration file.
#[derive(Parser, Clone, Debug, Default)]
pub struct ConfigFlags {
    /// Layer configuration file [default: ./.lambda-layer.toml, or $LAMBDA_LAYER_CONFIG]
    #[clap(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(Var::ConfigPath.get()))
    }

    pub fn load(&self) -> Result<lambda_layer::ConfigFile> {
        Ok(lambda_layer::ConfigFile::load(self.path())?)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Create a new .lambda-layer.toml file
    Init(CmdInit),

    /// Display the configured layers
    Show(CmdShow),

    /// Build layer archives
    Build(CmdBuild),
}

impl Opt {
    async fn run(self) -> Result<i32> {
        // Logs go to stderr, stdout is reserved for command output
        tracing_subscriber::fmt()
            .with_max_level(self.logging.level())
            .with_writer(std::io::stderr)
            .init();

        match self.cmd {
            Command::Init(mut cmd) => cmd.run().await,
            Command::Show(mut cmd) => cmd.run().await,
            Command::Build(mut cmd) => cmd.run().await,
        }
    }
}

/// Lists the recognized environment variables below the usual `--help` text.
fn environment_help() -> String {
    let rows: Vec<String> = Var::ALL
        .iter()
        .map(|var| format!("  {:<24}{}", var.name(), var.help()))
        .collect();
    format!("Environment variables:\n{}", rows.join("\n"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Opt::command()
        .after_help(environment_help())
        .get_matches();
    let opt = Opt::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let code = opt.run().await?;
    std::process::exit(code);
}
