//! # WhatsApp to Nextcloud bridge
//!
//! Webhook receiver for the WhatsApp Business Cloud API. Text messages are
//! echoed back, voice messages are downloaded and copied to Nextcloud over
//! WebDAV, and every processed message is appended to a CSV audit log.

pub mod config;
pub mod consts;
pub mod logger;
pub mod repo;
pub mod services;
pub mod utils;
pub mod webhook;

use anyhow::Context;
use envconfig::Envconfig;
use ntex::web;
use std::{path::Path, sync::Arc};

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    let app_config =
        config::AppConfig::init_from_env().context("failed to load configuration from env")?;
    app_config.validate()?;

    logger::setup_simple_logger(app_config.level_filter()?)?;

    prepare_downloads_dir(&app_config.downloads_path()).await?;

    let app_state = create_app_state(app_config)?;
    run_server(Arc::new(app_state)).await
}

/// Creates the downloads directory if it doesn't exist yet
async fn prepare_downloads_dir(path: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("failed to create downloads dir {}", path.display()))
}

/// Creates application state from the loaded configuration
fn create_app_state(app_config: config::AppConfig) -> anyhow::Result<webhook::AppState> {
    Ok(webhook::AppState {
        reply_timezone: app_config.timezone()?,
        whatsapp_client: webhook::whatsapp::client::WhatsAppClient::new(&app_config),
        storage_service: Box::new(services::storage::NextcloudStorage::new(&app_config)),
        audit_repo: Box::new(repo::csv_log::CsvAuditLog::new(&app_config.audit_log_path)),
        config: app_config,
    })
}

async fn run_server(app_state: Arc<webhook::AppState>) -> anyhow::Result<()> {
    let server_addr = ("0.0.0.0", app_state.config.port);
    log::info!("Server is listening on port: {}", app_state.config.port);

    web::server(move || {
        web::App::new()
            .wrap(web::middleware::Logger::default())
            .state(app_state.clone())
            .configure(webhook::routes::whatsapp)
            .service(webhook::routes::index)
    })
    .bind(server_addr)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
