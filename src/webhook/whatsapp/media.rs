//! # Voice message pipeline
//!
//! Resolve the media id into a download url, stream the audio to the
//! downloads directory, then upload the local copy to Nextcloud while a
//! confirmation reply goes out. Each stage is attempted once; the outcome is
//! returned as the message's audit record.
//!
//! The downloaded file is kept whatever happens afterwards, so a failed
//! upload can be recovered by hand.

use super::{handler::InboundEvent, schemas::MediaMessage};
use crate::{
    consts,
    repo::{AuditRecord, TransferStatus},
    webhook::AppState,
};
use log::{error, info, warn};

/// `{name}_{phone}_{timestamp}.ogg`, the local and remote name of a voice message.
///
/// Path separators in the payload values become `-` so the name always
/// stays inside the downloads directory.
pub fn artifact_file_name(contact_name: &str, phone_number: &str, timestamp: &str) -> String {
    let part = |value: &str| value.replace(['/', '\\'], "-");

    format!(
        "{}_{}_{}.{}",
        part(contact_name),
        part(phone_number),
        part(timestamp),
        consts::AUDIO_FILE_EXTENSION
    )
}

/// Confirmation sent once the audio is on disk. Failures never stop the upload.
async fn send_audio_auto_reply(state: &AppState, event: &InboundEvent<'_>) {
    let Some(phone_number_id) = event.phone_number_id else {
        warn!(
            "no phone_number_id in payload, skipping auto-reply to {}",
            event.message.id
        );
        return;
    };

    match state
        .whatsapp_client
        .send_text_reply(
            phone_number_id,
            &event.message.from,
            consts::AUDIO_AUTO_REPLY.to_string(),
            &event.message.id,
        )
        .await
    {
        Ok(_) => info!("auto-reply sent to {}", event.message.from),
        Err(e) => error!("failed to send auto-reply to {}: {:#}", event.message.from, e),
    }
}

/// Runs the pipeline for one audio message and returns its audit record
pub async fn transfer_audio(
    state: &AppState,
    event: &InboundEvent<'_>,
    audio: &MediaMessage,
) -> AuditRecord {
    let message = event.message;
    let record = |download: TransferStatus, upload: TransferStatus, error: Option<String>| {
        AuditRecord::audio(&message.from, &event.contact_name, download, upload, error)
    };

    let media_url = match state.whatsapp_client.get_media_url(&audio.id).await {
        Ok(url) => url,
        Err(e) => {
            error!("failed to resolve media {}: {:#}", audio.id, e);
            return record(
                TransferStatus::Failed,
                TransferStatus::NotApplicable,
                Some(format!("{e:#}")),
            );
        }
    };

    let file_name = artifact_file_name(&event.contact_name, &message.from, &message.timestamp);
    let local_path = state.config.downloads_path().join(&file_name);

    match state
        .whatsapp_client
        .download_media(&media_url, &local_path)
        .await
    {
        Ok(size) => info!("voice message downloaded: {} ({} bytes)", file_name, size),
        Err(e) => {
            error!("failed to download voice message {}: {:#}", file_name, e);
            return record(
                TransferStatus::Failed,
                TransferStatus::NotApplicable,
                Some(format!("{e:#}")),
            );
        }
    }

    let (_, upload) = futures::join!(
        send_audio_auto_reply(state, event),
        state.storage_service.upload_file(&local_path, &file_name)
    );

    match upload {
        Ok(()) => {
            info!("voice message uploaded to Nextcloud: {}", file_name);
            record(TransferStatus::Success, TransferStatus::Success, None)
        }
        Err(e) => {
            error!(
                "failed to upload {} to Nextcloud, local copy kept at {}: {:#}",
                file_name,
                local_path.display(),
                e
            );
            record(
                TransferStatus::Success,
                TransferStatus::Failed,
                Some(format!("{e:#}")),
            )
        }
    }
}
