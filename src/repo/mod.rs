//! Persistence of processed messages.
//!
//! The only persisted state besides the downloaded media is an append-only
//! audit log with one [`AuditRecord`] per processed message.

pub mod csv_log;

use async_trait::async_trait;
use serde::Serialize;

/// Outcome of one transfer stage as written in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransferStatus {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "n/a")]
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggedMessageType {
    Text,
    Audio,
}

/// One line of the audit log. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    /// Processing time, RFC3339
    pub timestamp: String,
    pub phone_number: String,
    pub contact_name: String,
    pub message_type: LoggedMessageType,
    pub download_status: TransferStatus,
    pub nextcloud_status: TransferStatus,
    /// Empty when the message was handled without error
    pub error: String,
}

impl AuditRecord {
    /// Record for an echoed text message, `error` set when a send failed
    pub fn text(phone_number: &str, contact_name: &str, error: Option<String>) -> Self {
        Self::new(
            phone_number,
            contact_name,
            LoggedMessageType::Text,
            TransferStatus::NotApplicable,
            TransferStatus::NotApplicable,
            error,
        )
    }

    /// Record for a voice message after the pipeline reached a terminal stage
    pub fn audio(
        phone_number: &str,
        contact_name: &str,
        download_status: TransferStatus,
        nextcloud_status: TransferStatus,
        error: Option<String>,
    ) -> Self {
        Self::new(
            phone_number,
            contact_name,
            LoggedMessageType::Audio,
            download_status,
            nextcloud_status,
            error,
        )
    }

    fn new(
        phone_number: &str,
        contact_name: &str,
        message_type: LoggedMessageType,
        download_status: TransferStatus,
        nextcloud_status: TransferStatus,
        error: Option<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            phone_number: phone_number.to_string(),
            contact_name: contact_name.to_string(),
            message_type,
            download_status,
            nextcloud_status,
            error: error.unwrap_or_default(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditRepo: Send + Sync {
    /// Appends one record. Records are never rewritten or removed.
    async fn append(&self, record: &AuditRecord) -> anyhow::Result<()>;
}

pub type ImplAuditRepo = Box<dyn AuditRepo>;
