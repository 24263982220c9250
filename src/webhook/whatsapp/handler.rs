//! # WhatsApp Message Router
//!
//! Dispatches the message of an incoming webhook: text messages are echoed
//! back with a read receipt, audio messages go through the
//! [media pipeline](super::media), every other type is ignored.
//!
//! Nothing here returns an error to the caller. Failures are logged to the
//! console and folded into the audit record of the message.

use super::{
    media,
    schemas::{Message, MessageKind, TextMessage, WebhookPayload},
};
use crate::{consts, repo::AuditRecord, webhook::AppState};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, error, info};

/// The part of a webhook payload the router works with
#[derive(Debug)]
pub struct InboundEvent<'a> {
    pub message: &'a Message,
    /// Business phone number replies are sent from
    pub phone_number_id: Option<&'a str>,
    /// Sender name, already passed through [`sanitize_contact_name`]
    pub contact_name: String,
}

impl<'a> InboundEvent<'a> {
    /// `None` when the payload carries no message (status updates, ...)
    pub fn from_payload(payload: &'a WebhookPayload) -> Option<Self> {
        Some(Self {
            message: payload.first_message()?,
            phone_number_id: payload.phone_number_id(),
            contact_name: sanitize_contact_name(payload.contact_name()),
        })
    }
}

/// Collapses whitespace runs (and path separators) into `-`.
///
/// Missing or blank names become `unknown`.
pub fn sanitize_contact_name(name: Option<&str>) -> String {
    let sanitized = name
        .unwrap_or_default()
        .replace(['/', '\\'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");

    if sanitized.is_empty() {
        return consts::UNKNOWN_CONTACT_NAME.to_string();
    }

    sanitized
}

/// Echo reply text: the received body followed by the local time
pub fn echo_body(body: &str, now: DateTime<Tz>) -> String {
    format!(
        "{}{}\n{}",
        consts::ECHO_REPLY_PREFIX,
        body,
        now.format(consts::REPLY_TIMESTAMP_FORMAT)
    )
}

async fn send_echo(state: &AppState, event: &InboundEvent<'_>, text: &TextMessage) -> Result<()> {
    let phone_number_id = event
        .phone_number_id
        .context("payload has no metadata.phone_number_id to reply from")?;
    let message = event.message;

    let body = echo_body(&text.body, Utc::now().with_timezone(&state.reply_timezone));
    state
        .whatsapp_client
        .send_text_reply(phone_number_id, &message.from, body, &message.id)
        .await
        .context("failed to send echo reply")?;

    state
        .whatsapp_client
        .mark_as_read(phone_number_id, &message.id)
        .await
        .context("failed to send read receipt")?;

    Ok(())
}

/// Echoes a text message and marks it as read. No retry on failure.
async fn handle_text_message(
    state: &AppState,
    event: &InboundEvent<'_>,
    text: &TextMessage,
) -> AuditRecord {
    let error = match send_echo(state, event, text).await {
        Ok(()) => {
            info!("echo sent to {}", event.message.from);
            None
        }
        Err(e) => {
            error!("failed to answer text message {}: {:#}", event.message.id, e);
            Some(format!("{e:#}"))
        }
    };

    AuditRecord::text(&event.message.from, &event.contact_name, error)
}

/// Appends to the audit log; a failure only reaches the console
async fn append_audit_record(state: &AppState, record: &AuditRecord) {
    if let Err(e) = state.audit_repo.append(record).await {
        error!("failed to append audit record: {:#}", e);
    }
}

/// Main webhook processor
///
/// Routes the first message of `payload` and writes its audit record.
/// Payloads without a message are a no-op.
pub async fn process_webhook(payload: &WebhookPayload, state: &AppState) {
    let Some(event) = InboundEvent::from_payload(payload) else {
        debug!("webhook carries no message, nothing to do");
        return;
    };

    let record = match event.message.kind() {
        MessageKind::Text(text) => handle_text_message(state, &event, text).await,
        MessageKind::Audio(audio) => media::transfer_audio(state, &event, audio).await,
        MessageKind::Other(msg_type) => {
            debug!("ignoring message {} of type {}", event.message.id, msg_type);
            return;
        }
    };

    append_audit_record(state, &record).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repo::{LoggedMessageType, MockAuditRepo, TransferStatus},
        services::MockStorageService,
        webhook::tests::test_state,
    };
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn text_payload(body: &str) -> WebhookPayload {
        serde_json::from_value(json!({
            "object": "whatsapp_business_account",
            "entry": [{"id": "WABA_ID", "changes": [{"field": "messages", "value": {
                "messaging_product": "whatsapp",
                "metadata": {"display_phone_number": "15550001111", "phone_number_id": "PHONE_ID"},
                "contacts": [{"profile": {"name": "John Doe"}, "wa_id": "33600000000"}],
                "messages": [{
                    "from": "33600000000",
                    "id": "wamid.TEXT",
                    "timestamp": "1700000000",
                    "type": "text",
                    "text": {"body": body}
                }]
            }}]}]
        }))
        .unwrap()
    }

    fn sent_message_response() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "messaging_product": "whatsapp",
            "contacts": [{"input": "33600000000", "wa_id": "33600000000"}],
            "messages": [{"id": "wamid.REPLY"}]
        }))
    }

    #[test]
    fn test_sanitize_contact_name() {
        assert_eq!(sanitize_contact_name(Some("John Doe")), "John-Doe");
        assert_eq!(sanitize_contact_name(Some("John   Q\tDoe")), "John-Q-Doe");
        assert_eq!(sanitize_contact_name(Some("Jane")), "Jane");
        assert_eq!(sanitize_contact_name(Some("../etc/passwd")), "..-etc-passwd");
        assert_eq!(sanitize_contact_name(Some("   ")), "unknown");
        assert_eq!(sanitize_contact_name(None), "unknown");
    }

    #[test]
    fn test_echo_body_format() {
        let now = Tz::Europe__Paris
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .unwrap();

        assert_eq!(echo_body("hello", now), "Echo: hello\n09/03/2024 14:05:07");
    }

    #[test]
    fn test_inbound_event_from_payload() {
        let payload = text_payload("hi");
        let event = InboundEvent::from_payload(&payload).unwrap();

        assert_eq!(event.phone_number_id, Some("PHONE_ID"));
        assert_eq!(event.contact_name, "John-Doe");
        assert_eq!(event.message.id, "wamid.TEXT");

        assert!(InboundEvent::from_payload(&WebhookPayload::default()).is_none());
    }

    #[tokio::test]
    async fn test_payload_without_message_writes_nothing() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        let mut audit = MockAuditRepo::new();
        audit.expect_append().never();
        let mut storage = MockStorageService::new();
        storage.expect_upload_file().never();

        let state = test_state(&server.uri(), dir.path(), storage, audit);
        let payload: WebhookPayload = serde_json::from_value(json!({
            "object": "whatsapp_business_account",
            "entry": [{"id": "WABA_ID", "changes": [{"field": "messages", "value": {
                "messaging_product": "whatsapp",
                "metadata": {"display_phone_number": "1", "phone_number_id": "PHONE_ID"},
                "statuses": [{"id": "wamid.X", "status": "read"}]
            }}]}]
        }))
        .unwrap();

        process_webhook(&payload, &state).await;

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_text_message_is_echoed_and_logged() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/PHONE_ID/messages"))
            .and(body_partial_json(json!({
                "to": "33600000000",
                "context": {"message_id": "wamid.TEXT"}
            })))
            .respond_with(sent_message_response())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/PHONE_ID/messages"))
            .and(body_partial_json(json!({"status": "read", "message_id": "wamid.TEXT"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let mut audit = MockAuditRepo::new();
        audit
            .expect_append()
            .times(1)
            .withf(|record| {
                record.message_type == LoggedMessageType::Text
                    && record.phone_number == "33600000000"
                    && record.contact_name == "John-Doe"
                    && record.download_status == TransferStatus::NotApplicable
                    && record.nextcloud_status == TransferStatus::NotApplicable
                    && record.error.is_empty()
            })
            .returning(|_| Ok(()));

        let state = test_state(&server.uri(), dir.path(), MockStorageService::new(), audit);
        process_webhook(&text_payload("hello"), &state).await;

        let requests = server.received_requests().await.unwrap();
        let reply: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(
            reply["text"]["body"]
                .as_str()
                .unwrap()
                .starts_with("Echo: hello\n")
        );
    }

    #[tokio::test]
    async fn test_text_send_failure_is_logged_once_without_receipt() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .and(body_partial_json(json!({"type": "text"})))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"status": "read"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut audit = MockAuditRepo::new();
        audit
            .expect_append()
            .times(1)
            .withf(|record| {
                record.message_type == LoggedMessageType::Text
                    && record.error.contains("failed to send echo reply")
                    && record.error.contains("500")
            })
            .returning(|_| Ok(()));

        let state = test_state(&server.uri(), dir.path(), MockStorageService::new(), audit);
        process_webhook(&text_payload("hello"), &state).await;
    }

    #[tokio::test]
    async fn test_unsupported_type_is_ignored() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        let mut audit = MockAuditRepo::new();
        audit.expect_append().never();

        let state = test_state(&server.uri(), dir.path(), MockStorageService::new(), audit);
        let payload: WebhookPayload = serde_json::from_value(json!({
            "entry": [{"changes": [{"value": {
                "metadata": {"phone_number_id": "PHONE_ID"},
                "messages": [{
                    "from": "33600000000",
                    "id": "wamid.IMG",
                    "timestamp": "1700000000",
                    "type": "image",
                    "image": {"id": "IMG_ID", "mime_type": "image/jpeg"}
                }]
            }}]}]
        }))
        .unwrap();

        process_webhook(&payload, &state).await;

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_audit_failure_is_swallowed() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .respond_with(sent_message_response())
            .mount(&server)
            .await;

        let mut audit = MockAuditRepo::new();
        audit
            .expect_append()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("disk full")));

        let state = test_state(&server.uri(), dir.path(), MockStorageService::new(), audit);
        process_webhook(&text_payload("hello"), &state).await;
    }
}
