//! # WhatsApp Webhook Schemas
//!
//! Data structures for the JSON payload WhatsApp posts when a message
//! arrives. Every field the router doesn't strictly need is optional so
//! that unexpected payloads (status updates, new message types) still
//! deserialize and get acknowledged.

use serde::{Deserialize, Serialize};

/// Root webhook payload from WhatsApp
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WebhookPayload {
    /// The object type, typically "whatsapp_business_account"
    #[serde(default)]
    pub object: String,
    /// Array of entry objects containing the actual data
    #[serde(default)]
    pub entry: Vec<Entry>,
}

/// Entry object containing changes
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Entry {
    /// Business Account ID
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub changes: Vec<Change>,
}

/// Change object containing the actual webhook data
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Change {
    /// The field that changed (e.g., "messages")
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: Value,
}

/// Value object containing messages and metadata
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Value {
    #[serde(default)]
    pub messaging_product: String,
    /// Metadata about the receiving business phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Array of contacts (senders)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Contact>>,
    /// Array of messages received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_phone_number: Option<String>,
    /// Phone number ID used to address replies
    pub phone_number_id: String,
}

/// Contact information for the message sender
#[derive(Debug, Deserialize, Serialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    /// WhatsApp ID (phone number)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wa_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Display name of the contact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Message object
#[derive(Debug, Deserialize, Serialize)]
pub struct Message {
    /// Sender's WhatsApp ID (phone number)
    pub from: String,
    /// Message ID, used as reply context and for read receipts
    pub id: String,
    /// Seconds since epoch, as sent by WhatsApp
    pub timestamp: String,
    /// Message type (text, audio, image, ...)
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<MediaMessage>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TextMessage {
    pub body: String,
}

/// Media message content
#[derive(Debug, Deserialize, Serialize)]
pub struct MediaMessage {
    /// Media ID, exchanged for a short-lived download url
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Set by WhatsApp for push-to-talk voice notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<bool>,
}

/// Typed view over [`Message`] the router dispatches on
#[derive(Debug)]
pub enum MessageKind<'a> {
    Text(&'a TextMessage),
    Audio(&'a MediaMessage),
    /// Any other type, or a known type missing its content object
    Other(&'a str),
}

impl Message {
    pub fn kind(&self) -> MessageKind<'_> {
        match (self.msg_type.as_str(), &self.text, &self.audio) {
            ("text", Some(text), _) => MessageKind::Text(text),
            ("audio", _, Some(audio)) => MessageKind::Audio(audio),
            (other, _, _) => MessageKind::Other(other),
        }
    }
}

impl WebhookPayload {
    /// `entry[0].changes[0].value`, where WhatsApp puts a single message
    fn first_value(&self) -> Option<&Value> {
        self.entry
            .first()?
            .changes
            .first()
            .map(|change| &change.value)
    }

    /// First message of the payload, if any
    pub fn first_message(&self) -> Option<&Message> {
        self.first_value()?.messages.as_ref()?.first()
    }

    /// Business phone number ID the message was delivered to
    pub fn phone_number_id(&self) -> Option<&str> {
        self.first_value()?
            .metadata
            .as_ref()
            .map(|metadata| metadata.phone_number_id.as_str())
    }

    /// Profile name of the first contact
    pub fn contact_name(&self) -> Option<&str> {
        self.first_value()?
            .contacts
            .as_ref()?
            .first()?
            .profile
            .as_ref()?
            .name
            .as_deref()
    }
}
