//! Webhook handlers for the WhatsApp Business Cloud API
//!
//! ## Modules
//!
//! - [`routes`] - route wiring and the informational index page
//! - [`whatsapp`] - verification, message routing and the media pipeline

pub mod routes;
pub mod whatsapp;

use crate::{config::AppConfig, repo, services};
use chrono_tz::Tz;

/// Shared, read-only state handed to every request
pub struct AppState {
    pub config: AppConfig,
    /// Parsed `REPLY_TIMEZONE`
    pub reply_timezone: Tz,
    pub whatsapp_client: whatsapp::client::WhatsAppClient,
    pub storage_service: services::ImplStorageService,
    pub audit_repo: repo::ImplAuditRepo,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{config, repo::MockAuditRepo, services::MockStorageService};

    /// State whose Graph API calls go to `base_url` and downloads to `downloads_dir`
    pub(crate) fn test_state(
        base_url: &str,
        downloads_dir: &std::path::Path,
        storage: MockStorageService,
        audit: MockAuditRepo,
    ) -> AppState {
        let config = config::tests::test_config(base_url, downloads_dir.to_str().unwrap());

        AppState {
            reply_timezone: Tz::Europe__Paris,
            whatsapp_client: whatsapp::client::WhatsAppClient::new(&config),
            storage_service: Box::new(storage),
            audit_repo: Box::new(audit),
            config,
        }
    }
}
