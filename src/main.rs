//! Wesnoth Multiplayer Dashboard - Unified CLI
//!
//! Serves the analytics dashboard over the multiplayer game database.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wesnoth_mp_dashboard::{AppConfig, AppState, Cli, Command, GameRepository, router, sample};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { host, port, config } => run_server(host, port, config).await,
        Command::InitSample { db_path } => run_init_sample(&db_path),
    }
}

/// Run the dashboard web server
async fn run_server(host: String, port: u16, config_path: std::path::PathBuf) -> Result<()> {
    init_tracing();

    info!("Starting Wesnoth Multiplayer Dashboard");
    let config = AppConfig::load(&config_path)?.into_shared();
    let base = config.url_base_pathname().clone();

    let repository = GameRepository::new(config.clone());
    let state = AppState::new(config, repository);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(host = %host, port, "Dashboard ready at http://{}:{}{}", host, port, base);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create a SQLite database with the bundled sample dataset
fn run_init_sample(db_path: &str) -> Result<()> {
    init_tracing();

    sample::init_sample_database(db_path)?;
    info!(
        path = %db_path,
        games = sample::SAMPLE_GAME_COUNT,
        "Sample database ready; serve it with backend = \"sqlite\""
    );
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,wesnoth_mp_dashboard=debug")),
        )
        .init();
}
