//! WhatsApp webhook endpoint handlers
//!
//! Implements both the verification endpoint (GET) and the webhook
//! receiver (POST).

use super::{handler, schemas};
use crate::{consts, webhook::AppState};
use log::{debug, info, warn};
use ntex::{util::Bytes, web};
use serde::Deserialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Query parameters for webhook verification.
///
/// All optional: a missing parameter fails verification with 403 instead
/// of being rejected as a malformed query.
#[derive(Deserialize)]
pub struct VerifyQuery {
    /// Should be "subscribe"
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    /// The verification token configured in the WhatsApp dashboard
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    /// The challenge string to echo back
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

impl VerifyQuery {
    /// `true` for a "subscribe" request carrying `expected_token`
    pub fn is_valid_subscription(&self, expected_token: &str) -> bool {
        let (Some(mode), Some(token)) = (&self.mode, &self.verify_token) else {
            return false;
        };

        mode == consts::VERIFY_MODE_SUBSCRIBE
            && bool::from(token.as_bytes().ct_eq(expected_token.as_bytes()))
    }
}

/// Webhook verification endpoint (GET)
///
/// # Returns
/// - 200 with the challenge string if verification succeeds
/// - 403 with an empty body otherwise
#[web::get("")]
pub async fn verify(
    query: web::types::Query<VerifyQuery>,
    app_state: web::types::State<Arc<AppState>>,
) -> web::HttpResponse {
    if !query.is_valid_subscription(&app_state.config.webhook_verify_token) {
        warn!("webhook verification rejected");
        return web::HttpResponse::Forbidden().finish();
    }

    info!("webhook verified successfully");

    web::HttpResponse::Ok()
        .content_type("text/plain")
        .body(query.challenge.clone().unwrap_or_default())
}

fn acknowledge() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "received"
    }))
}

/// Webhook receiver endpoint (POST)
///
/// Always answers 200: WhatsApp retries deliveries that aren't
/// acknowledged, and a processing failure would not go away on retry.
/// The message itself is handled in a background task.
#[web::post("")]
pub async fn receive(
    body: Bytes,
    app_state: web::types::State<Arc<AppState>>,
) -> web::HttpResponse {
    debug!("incoming webhook: {}", String::from_utf8_lossy(&body));

    let payload: schemas::WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("failed to parse webhook payload: {}", e);
            return acknowledge();
        }
    };

    if payload.first_message().is_none() {
        return acknowledge();
    }

    let state: Arc<AppState> = (*app_state).clone();
    ntex::rt::spawn(async move {
        handler::process_webhook(&payload, &state).await;
    });

    acknowledge()
}
