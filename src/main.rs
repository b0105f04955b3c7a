//! Railbook server binary
//!
//! Boots the train booking service: configuration, logging, SQLite with
//! migrations and demo seed data, then the HTTP server.

use railbook::{api, core, db};

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize logging system based on configuration
    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Configuration loaded successfully");
    info!("Starting Railbook v{}", env!("CARGO_PKG_VERSION"));
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Server configuration"
    );
    info!(
        path = ?config.database.path,
        "Database configuration"
    );

    // The database file lives in a directory that may not exist yet
    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating directory: {:?}", parent);
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("Failed to create directory {:?}: {}", parent, e)
            })?;
        }
    }

    // Initialize database; the manager runs migrations on construction
    info!("Initializing database...");
    let db = Arc::new(db::DatabaseManager::new(
        &config.database.path,
        config.database.connection_pool_size as u32,
        std::time::Duration::from_millis(config.database.busy_timeout),
    )?);
    info!("Database initialized successfully");

    // Seed the catalog and demo accounts on an empty database
    if config.seed.enable_demo_data {
        let station_repo = db::StationRepository::new(db.clone());
        let train_repo = db::TrainRepository::new(db.clone());
        let user_repo = db::UserRepository::new(db.clone());
        db::seed::seed_catalog(&station_repo, &train_repo).await?;
        db::seed::seed_demo_accounts(&user_repo).await?;
    }

    // Initialize API server
    info!("Initializing HTTP server...");
    let server_url = format!("http://{}:{}", config.server.host, config.server.port);
    let server = api::ApiServer::new(config, db)?;

    info!("Railbook initialized successfully");
    info!(url = %server_url, "Server ready - starting to serve requests");

    // Start serving (this will block until shutdown signal)
    server.serve().await?;

    Ok(())
}
