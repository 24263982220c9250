use crate::{config::AppConfig, consts, utils::ensure_success};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::{Url, header};
use std::path::Path;
use tokio_util::io::ReaderStream;

/// Nextcloud storage reached through WebDAV `PUT` requests
#[derive(Clone)]
pub struct NextcloudStorage {
    pub client: reqwest::Client,
    collection_url: String,
    username: String,
    password: String,
}

impl NextcloudStorage {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            collection_url: config.nextcloud_url.clone(),
            username: config.nextcloud_username.clone(),
            password: config.nextcloud_password.clone(),
        }
    }

    /// WebDAV url of `file_name` inside the configured collection.
    ///
    /// The name is pushed as a single, percent-encoded path segment.
    pub fn file_url(&self, file_name: &str) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.collection_url)
            .with_context(|| format!("invalid Nextcloud url {}", self.collection_url))?;

        url.path_segments_mut()
            .map_err(|_| anyhow!("Nextcloud url {} can't hold a file path", self.collection_url))?
            .pop_if_empty()
            .push(file_name);

        Ok(url)
    }
}

#[async_trait]
impl crate::services::StorageService for NextcloudStorage {
    async fn upload_file(&self, local_path: &Path, file_name: &str) -> anyhow::Result<()> {
        let file = tokio::fs::File::open(local_path)
            .await
            .with_context(|| format!("failed to open {} for upload", local_path.display()))?;
        let file_size = file.metadata().await?.len();

        let url = self.file_url(file_name)?;
        let response = self
            .client
            .put(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(header::CONTENT_TYPE, consts::AUDIO_CONTENT_TYPE)
            .header(header::CONTENT_LENGTH, file_size)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await
            .context("Failed to send upload request to Nextcloud")?;

        ensure_success(response, "Nextcloud").await?;

        Ok(())
    }
}
