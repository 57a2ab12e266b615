//! Workstead Server — application entry point.
//!
//! The presentation layer lives elsewhere; this process hosts the
//! lifecycle engine: it loads configuration from the environment,
//! connects to SurrealDB and brings the schema up to date.

use tracing_subscriber::EnvFilter;

use workstead_auth::config::AuthConfig;
use workstead_db::{DbConfig, DbManager};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("workstead=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting Workstead server...");

    let db_config = DbConfig::from_env();
    let auth_config = AuthConfig::from_env();
    tracing::info!(site = %auth_config.site_base_url, "Configuration loaded");

    let manager = match DbManager::connect(&db_config).await {
        Ok(manager) => manager,
        Err(err) => {
            tracing::error!(error = %err, "Failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(err) = workstead_db::run_migrations(manager.client()).await {
        tracing::error!(error = %err, "Schema migration failed");
        std::process::exit(1);
    }

    tracing::info!("Workstead engine ready.");
}
