//! # WhatsApp Outgoing Message Schemas
//!
//! JSON bodies posted to the Graph API `/{phone_number_id}/messages` endpoint.

use crate::consts::WHATSAPP_MESSAGING_PRODUCT;
use serde::{Deserialize, Serialize};

/// Text message to send to WhatsApp
#[derive(Debug, Serialize, Deserialize)]
pub struct OutgoingTextMessage {
    /// Messaging product, always "whatsapp"
    pub messaging_product: String,
    /// Recipient's WhatsApp ID (phone number)
    pub to: String,
    #[serde(rename = "type")]
    pub msg_type: String,
    pub text: OutgoingTextContent,
    /// Message being replied to, shown quoted by WhatsApp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ReplyContext>,
}

impl OutgoingTextMessage {
    pub fn new(to: String, body: String) -> Self {
        Self {
            messaging_product: WHATSAPP_MESSAGING_PRODUCT.to_string(),
            to,
            msg_type: "text".to_string(),
            text: OutgoingTextContent { body },
            context: None,
        }
    }

    /// Threads the message as a reply to `message_id`
    pub fn in_reply_to(mut self, message_id: String) -> Self {
        self.context = Some(ReplyContext { message_id });
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OutgoingTextContent {
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReplyContext {
    pub message_id: String,
}

/// Marks an incoming message as read (blue ticks)
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub messaging_product: String,
    /// Always "read"
    pub status: String,
    pub message_id: String,
}

impl ReadReceipt {
    pub fn new(message_id: String) -> Self {
        Self {
            messaging_product: WHATSAPP_MESSAGING_PRODUCT.to_string(),
            status: "read".to_string(),
            message_id,
        }
    }
}

/// Response from WhatsApp API when sending a message
#[derive(Debug, Serialize, Deserialize)]
pub struct WhatsAppMessageResponse {
    pub messaging_product: String,
    #[serde(default)]
    pub contacts: Vec<WhatsAppContact>,
    #[serde(default)]
    pub messages: Vec<WhatsAppMessageStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WhatsAppContact {
    pub wa_id: String,
    pub input: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WhatsAppMessageStatus {
    /// ID of the sent message
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_serializes_context() {
        let message = OutgoingTextMessage::new("33600000000".into(), "Echo: hi".into())
            .in_reply_to("wamid.TEXT".into());

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "messaging_product": "whatsapp",
                "to": "33600000000",
                "type": "text",
                "text": {"body": "Echo: hi"},
                "context": {"message_id": "wamid.TEXT"}
            })
        );
    }

    #[test]
    fn test_plain_message_skips_context() {
        let message = OutgoingTextMessage::new("1".into(), "hello".into());
        let value = serde_json::to_value(&message).unwrap();

        assert!(value.get("context").is_none());
    }

    #[test]
    fn test_read_receipt() {
        assert_eq!(
            serde_json::to_value(ReadReceipt::new("wamid.TEXT".into())).unwrap(),
            json!({"messaging_product": "whatsapp", "status": "read", "message_id": "wamid.TEXT"})
        );
    }
}
