//! WhatsApp webhook integration module
//!
//! ## Submodules
//!
//! - [`routes`] - `GET /webhook` verification handshake and `POST /webhook` receiver
//! - [`handler`] - message router (text echo, audio pipeline, ignored types)
//! - [`media`] - voice message pipeline: resolve, download, upload to Nextcloud
//! - [`client`] - WhatsApp Graph API client
//! - [`schemas`] - incoming and outgoing payloads

pub mod client;
pub mod handler;
pub mod media;
pub mod routes;
pub mod schemas;

pub use routes::{receive, verify};
