//! Command-line interface for the dashboard.

use clap::{Parser, Subcommand};

/// Wesnoth Multiplayer Dashboard - analytics over the multiplayer game database
#[derive(Parser, Debug)]
#[command(name = "wesnoth-mp-dashboard")]
#[command(about = "Analytics dashboard for the Wesnoth multiplayer game database", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the dashboard web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8050")]
        port: u16,

        /// Path to the TOML configuration file
        #[arg(short, long, default_value = "dashboard.toml")]
        config: std::path::PathBuf,
    },

    /// Create a SQLite database loaded with the bundled three-day sample dataset
    InitSample {
        /// Path of the database file to create
        #[arg(long, default_value = "wesnoth_mp.db")]
        db_path: String,
    },
}
