//! Transport layer: HTTP and wire-format details (serialization/deserialization).

mod media;
mod message;

pub use media::{MediaUpload, download_file_name};
pub use message::{
    encode_location_payload, encode_media_payload, encode_outbound_payload, encode_text_payload,
};

/// Parse a response body as JSON, whatever the HTTP status was.
pub fn decode_json_body(body: &str) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::from_str(body)
}
