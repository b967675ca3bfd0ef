//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Animal guessing game that learns a new question every time it guesses wrong
#[derive(Parser, Debug)]
#[command(name = "guesstree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output on stderr (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Tree file (default: from config)
    #[arg(short, long, global = true, env = "GUESSTREE_FILE", value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play rounds until you stop (default)
    Play {
        /// Skip the welcome text before each round
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the learned tree
    Show {
        /// One-line parenthesized form instead of a drawing
        #[arg(long)]
        inline: bool,
    },

    /// Print tree statistics
    Stats,

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
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
