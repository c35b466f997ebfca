//! Protolib CLI - list, install and try out operations

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use protolib_core::Value;
use protolib_stdlib::{Installer, Invoke};
use std::path::PathBuf;
use tracing::debug;

mod config;

#[derive(Parser)]
#[command(name = "protolib")]
#[command(about = "Extension operations for strings, lists, maps and errors", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List qualified operation names
    Ls {
        /// Group names or group:operation names (all groups when omitted)
        selectors: Vec<String>,
    },

    /// Show the library version
    Version {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Call one operation on a JSON receiver
    Call {
        /// Operation as group:name, e.g. string:tc
        operation: String,

        /// Receiver as JSON
        receiver: String,

        /// Arguments as JSON; anything that is not JSON is passed as a string
        args: Vec<String>,
    },

    /// Install operations and print the names that were bound
    Install {
        /// Group names or group:operation names (configured defaults when omitted)
        selectors: Vec<String>,

        /// Rebind operations that are already bound
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = config::load_config(cli.config)?;
    let installer = Installer::from_config(&config)?;

    match cli.command {
        Commands::Ls { selectors } => {
            for name in installer.ls(&selectors) {
                println!("{}", name);
            }
        }

        Commands::Version { json } => {
            let info = installer.version();
            if json {
                println!("{}", serde_json::to_string(&info)?);
            } else {
                println!("{} ({})", info.semantic_version, info.packed_integer);
            }
        }

        Commands::Call {
            operation,
            receiver,
            args,
        } => {
            let op = installer
                .registry()
                .lookup(&operation)
                .ok_or_else(|| anyhow!("unknown operation '{}'", operation))?
                .clone();

            installer.install(&[op.group.as_str()]);

            let mut receiver = Value::from_json_str(&receiver)?;
            let args: Vec<Value> = args.iter().map(|arg| parse_arg(arg)).collect();
            debug!("Calling {} with {} arguments", op.qualified_name(), args.len());

            let result = receiver.invoke(&op.name, &args)?;
            println!("{}", result.to_json_safe());
            if op.is_mutating() {
                println!("{}", receiver.to_json_safe());
            }
        }

        Commands::Install { selectors, force } => {
            let selectors = if selectors.is_empty() {
                config.install.clone()
            } else {
                selectors
            };
            let installer = installer.force(force || config.force);
            for name in installer.install(&selectors) {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

fn parse_arg(text: &str) -> Value {
    Value::from_json_str(text).unwrap_or_else(|_| Value::from(text))
}
