//! Wesnoth Multiplayer Dashboard library
//!
//! A thin presentation layer over the wesnothd multiplayer game database:
//! a date-range query fetches game records, a conditioning pass derives the
//! display table, and the HTTP layer hands the results to browser-side
//! chart and table widgets.
//!
//! # Architecture
//!
//! - **Config**: layered options (defaults, TOML file, environment)
//! - **Db**: per-request diesel queries against MariaDB or SQLite
//! - **Frame**: raw rows to derived table (durations, version buckets)
//! - **Server**: axum routes serving the pages and their JSON endpoints
//!
//! # Example
//!
//! ```no_run
//! use wesnoth_mp_dashboard::{AppConfig, AppState, GameRepository, router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Load configuration and build the router
//! let config = AppConfig::load("dashboard.toml")?.into_shared();
//! let repository = GameRepository::new(config.clone());
//! let app = router(AppState::new(config, repository));
//!
//! let listener = tokio::net::TcpListener::bind(("127.0.0.1", 8050)).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod cli;
mod config;
mod db;
mod frame;
mod server;

// Crate-level exports - Command line interface
pub use cli::{Cli, Command};

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError, DatabaseBackend, TableNames};

// Crate-level exports - Database access
pub use db::{
    AnyConnection, DateRange, DbError, DimensionSource, GameRepository, GameRow, StatsDimension,
    ValueCount, sample,
};

// Crate-level exports - Derived table
pub use frame::{FRAME_COLUMNS, GameFrame, game_duration_minutes, version_bucket};

// Crate-level exports - HTTP layer
pub use server::{ApiError, AppState, router};
