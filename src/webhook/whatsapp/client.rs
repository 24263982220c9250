//! # WhatsApp API Client
//!
//! Client for the WhatsApp Cloud (Graph) API: text replies, read receipts,
//! and the two-step media retrieval (resolve the media id, then stream the
//! binary from the short-lived url).

use super::schemas::{OutgoingTextMessage, ReadReceipt, WhatsAppMessageResponse};
use crate::{config::AppConfig, utils::ensure_success};
use anyhow::{Context, Result};
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Response from the Graph API media lookup
#[derive(Debug, serde::Deserialize)]
pub struct MediaUrlResponse {
    /// Download url, valid for a few minutes
    pub url: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// WhatsApp API client for sending messages and fetching media
pub struct WhatsAppClient {
    client: reqwest::Client,
    /// Graph API root including the version, without trailing slash
    base_url: String,
    /// Authentication token
    auth_token: String,
}

impl WhatsAppClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.graph_api_base_url.trim_end_matches('/').to_string(),
            auth_token: config.graph_api_token.clone(),
        }
    }

    /// Endpoint to send messages from a business phone number
    fn send_msg_endpoint(&self, phone_number_id: &str) -> String {
        format!("{}/{}/messages", self.base_url, phone_number_id)
    }

    fn media_endpoint(&self, media_id: &str) -> String {
        format!("{}/{}", self.base_url, media_id)
    }

    /// Sends a text message threaded as a reply to `reply_to`
    ///
    /// # Arguments
    /// * `phone_number_id` - Business phone number the webhook was delivered to
    /// * `to` - Recipient's WhatsApp ID (phone number with country code)
    /// * `body` - Message text
    /// * `reply_to` - ID of the message being answered
    pub async fn send_text_reply(
        &self,
        phone_number_id: &str,
        to: &str,
        body: String,
        reply_to: &str,
    ) -> Result<WhatsAppMessageResponse> {
        let message =
            OutgoingTextMessage::new(to.to_string(), body).in_reply_to(reply_to.to_string());

        self.send_message(phone_number_id, &message)
            .await?
            .json()
            .await
            .context("Failed to parse WhatsApp API response")
    }

    /// Marks an incoming message as read
    pub async fn mark_as_read(&self, phone_number_id: &str, message_id: &str) -> Result<()> {
        self.send_message(phone_number_id, &ReadReceipt::new(message_id.to_string()))
            .await?;

        Ok(())
    }

    /// Exchanges a media id for its download url
    pub async fn get_media_url(&self, media_id: &str) -> Result<String> {
        let response = self
            .client
            .get(self.media_endpoint(media_id))
            .bearer_auth(&self.auth_token)
            .send()
            .await
            .context("Failed to send media lookup request to WhatsApp API")?;

        let media: MediaUrlResponse = ensure_success(response, "WhatsApp media lookup")
            .await?
            .json()
            .await
            .context("Failed to parse WhatsApp media lookup response")?;

        log::debug!(
            "media {} resolved: mime_type={:?}, file_size={:?}",
            media_id,
            media.mime_type,
            media.file_size
        );

        Ok(media.url)
    }

    /// Streams the media at `url` into a new file at `destination`
    ///
    /// The body is written chunk by chunk and never held in memory as a
    /// whole. The file is only created once the server answered with a
    /// success status.
    ///
    /// # Returns
    /// * `Result<u64>` - Number of bytes written
    pub async fn download_media(&self, url: &str, destination: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.auth_token)
            .send()
            .await
            .context("Failed to send media download request")?;
        let response = ensure_success(response, "WhatsApp media download").await?;

        let mut file = tokio::fs::File::create(destination)
            .await
            .with_context(|| format!("failed to create {}", destination.display()))?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("media download stream interrupted")?;
            file.write_all(&chunk)
                .await
                .with_context(|| format!("failed to write {}", destination.display()))?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }

    /// Internal method to send any message type to WhatsApp API
    async fn send_message<T: serde::Serialize>(
        &self,
        phone_number_id: &str,
        message: &T,
    ) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.send_msg_endpoint(phone_number_id))
            .bearer_auth(&self.auth_token)
            .json(message)
            .send()
            .await
            .context("Failed to send request to WhatsApp API")?;

        ensure_success(response, "WhatsApp API").await
    }
}
