//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Resolve PostgreSQL service-file entries into PG* environment variables
#[derive(Parser, Debug)]
#[command(name = "pgservice")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Settings file (TOML), layered over the global one
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the parameters of a service
    Show {
        #[command(flatten)]
        target: ServiceArgs,
        /// Print the password instead of masking it
        #[arg(long)]
        reveal: bool,
    },

    /// Print shell exports for a service (use with eval)
    Env {
        #[command(flatten)]
        target: ServiceArgs,
    },

    /// List services in the service file
    List {
        /// Service file (default: ~/.pg_service.conf)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Service selection shared by commands that read a section.
#[derive(Args, Debug)]
pub struct ServiceArgs {
    /// Service name (overridden by PGSERVICE)
    pub service: Option<String>,

    /// Service file (overridden by PGSERVICEFILE)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Print a settings template
    Template,
    /// Show the global settings path
    Path,
}
