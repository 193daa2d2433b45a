//! Massdriver CLI
//!
//! Copyright 2025 Massdriver, Inc.
//! Licensed under the Apache License, Version 2.0; you may not use this file except in compliance with the License.
//! See the LICENSE file in the project root for details.

mod commands;
mod error;
mod ops;
#[cfg(test)]
mod test_helpers;
mod utils;

use clap::{CommandFactory, Parser, Subcommand};
use commands::{bundle, completion, schema};
use tracing_subscriber::EnvFilter;

/// Massdriver CLI - Build bundles and dereference bundle schemas
#[derive(Parser)]
#[command(name = "mass")]
#[command(about = "Massdriver CLI - Build bundles and dereference bundle schemas", long_about = None)]
#[command(version = env!("MASS_VERSION"))]
struct Cli {
    /// Log every ref resolved and file written
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with bundles
    Bundle {
        #[command(subcommand)]
        command: BundleCommands,
    },
    /// Work with JSON Schemas
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
    /// Generate shell completion scripts
    Completion {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

#[derive(Subcommand)]
enum BundleCommands {
    /// Dereference schemas and generate Terraform/OpenTofu variable files
    Build {
        /// Bundle directory containing massdriver.yaml
        #[arg(short, long, default_value = ".")]
        path: String,
        /// Directory for the generated schema-*.json files
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Resolve every $ref in a schema and print the result
    Dereference {
        /// Schema file (JSON or YAML)
        file: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Get the CLI command structure (used for completion generation)
pub fn get_cli_command() -> clap::Command {
    Cli::command()
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match cli.command {
        Commands::Bundle {
            command: BundleCommands::Build { path, output },
        } => bundle::run(&bundle::Options { path, output }),
        Commands::Schema {
            command: SchemaCommands::Dereference { file, output },
        } => schema::run(&schema::Options { file, output }),
        Commands::Completion { shell } => completion::run(&completion::Options { shell }),
    };

    std::process::exit(exit_code);
}
