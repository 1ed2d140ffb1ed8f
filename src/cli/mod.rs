//! CLI module - Command-line interface for the bloqueos server
//!
//! Argument parsing uses clap; each subcommand lives in `commands`.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bloqueos - registro de bloqueos de dispositivos
#[derive(Parser)]
#[command(name = "bloqueos")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file; the usual locations are searched otherwise
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    #[command(alias = "web")]
    Serve,

    /// Create an account
    CreateUser {
        username: String,

        password: String,

        /// Grant access to the admin pages
        #[arg(long)]
        admin: bool,
    },

    /// Create default config file
    #[command(alias = "init")]
    InitConfig,
}

pub use commands::*;
