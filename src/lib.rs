//! Typed Rust client for the WhatsApp Cloud messaging API.
//!
//! The crate keeps three layers apart: a domain layer of validated types, a
//! transport layer for the vendor's wire-format quirks, and a small client
//! layer that issues exactly one HTTP request per call.
//!
//! ```rust,no_run
//! use wacloud::{AccessToken, MessageBody, OwnerId, Recipient, SendText, TextOptions, WhatsAppClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), wacloud::WhatsAppError> {
//!     let client = WhatsAppClient::new(AccessToken::new("...")?, OwnerId::new("104512345678901")?);
//!     let request = SendText::new(
//!         Recipient::new("919405235423")?,
//!         MessageBody::new("hello")?,
//!         TextOptions::default(),
//!     );
//!     let response = client.send_text(request).await?;
//!     if let Some(error) = response.get("error") {
//!         eprintln!("API rejected the message: {error}");
//!     }
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{ApiResult, ClientConfig, WhatsAppClient, WhatsAppClientBuilder, WhatsAppError};
pub use domain::{
    AccessToken, ApiVersion, Caption, FileStem, Latitude, Longitude, MediaId, MediaKind,
    MediaLink, MediaSource, MessageBody, OutboundMessage, OwnerId, PhoneNumber, Recipient,
    RecipientType, RecordKind, SavedMedia, SendLocation, SendMedia, SendText, StatusRecord,
    TextOptions, ValidationError,
};
