pub const WHATSAPP_MESSAGING_PRODUCT: &str = "whatsapp";
pub const VERIFY_MODE_SUBSCRIBE: &str = "subscribe";

/// Fallback used for the file name when the sender has no profile name
pub const UNKNOWN_CONTACT_NAME: &str = "unknown";
pub const AUDIO_FILE_EXTENSION: &str = "ogg";
pub const AUDIO_CONTENT_TYPE: &str = "audio/ogg";

pub const ECHO_REPLY_PREFIX: &str = "Echo: ";
pub const REPLY_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
pub const AUDIO_AUTO_REPLY: &str = "Voice message received, thank you!";

pub const INDEX_PAGE: &str = "<pre>Nothing to see here. Checkout README.md to start.</pre>";

pub const AUDIT_LOG_HEADER: [&str; 7] = [
    "timestamp",
    "phone_number",
    "contact_name",
    "message_type",
    "download_status",
    "nextcloud_status",
    "error",
];
