//! # WhatsApp Cloud API Schemas
//!
//! - `incoming`: webhook payloads delivered to `POST /webhook`
//! - `outgoing`: bodies sent to the Graph API (replies and read receipts)

pub mod incoming;
pub mod outgoing;

pub use incoming::*;
pub use outgoing::*;
