//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Query and rewrite nested section configuration files
#[derive(Parser, Debug)]
#[command(name = "castor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the first value at a path
    Get {
        /// Configuration file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Path parts, e.g. `server port` or `server.port`
        #[arg(required = true)]
        path: Vec<String>,
        /// Interpret the value as a boolean
        #[arg(short = 'b', long = "bool")]
        as_bool: bool,
        /// Print this instead of failing when the path is missing
        #[arg(long)]
        default: Option<String>,
    },

    /// Print every value at a path, one per line
    GetAll {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(required = true)]
        path: Vec<String>,
        /// Interpret the values as booleans
        #[arg(short = 'b', long = "bool")]
        as_bool: bool,
    },

    /// List section names directly under a path
    Sections {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        path: Vec<String>,
    },

    /// List key names directly under a path
    Names {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        path: Vec<String>,
    },

    /// Overwrite every value at a path and save the file
    Set {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// New value
        value: String,
        #[arg(required = true)]
        path: Vec<String>,
    },

    /// Print the file in canonical form
    Fmt {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Rewrite the file in place
        #[arg(short, long)]
        write: bool,
    },

    /// Show the file, or the first section at a path, as a tree
    Tree {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Optional section path
        path: Vec<String>,
    },

    /// Resolve a configuration by name using the settings search path
    Lookup {
        /// Logical name, e.g. `net` for net.conf
        name: String,
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

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Print a settings template
    Template,
    /// Show the global settings file location
    Path,
}
