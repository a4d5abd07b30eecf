use std::path::Path;

use crate::domain::{FileStem, ValidationError};
use crate::transport::message::MESSAGING_PRODUCT;

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Extension ↔ MIME pairs for the media types the Cloud API accepts.
///
/// Lookups by MIME type take the first matching row, so the preferred
/// extension for a MIME type must come first.
const MIME_TABLE: &[(&str, &str)] = &[
    ("aac", "audio/aac"),
    ("amr", "audio/amr"),
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("ogg", "audio/ogg"),
    ("opus", "audio/ogg"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("mp4", "video/mp4"),
    ("3gp", "video/3gpp"),
    ("txt", "text/plain"),
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("ppt", "application/vnd.ms-powerpoint"),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
];

/// Guess a MIME type from the file extension, falling back to
/// [`DEFAULT_MIME_TYPE`].
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let Some(extension) = path.extension().and_then(|it| it.to_str()) else {
        return DEFAULT_MIME_TYPE;
    };
    let extension = extension.to_ascii_lowercase();
    MIME_TABLE
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME_TYPE)
}

/// File extension for a MIME type; parameters (`; codecs=opus`) are ignored.
pub fn extension_for_mime_type(mime_type: &str) -> Result<&'static str, ValidationError> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if essence.is_empty() {
        return Err(ValidationError::Empty { field: "mime_type" });
    }
    MIME_TABLE
        .iter()
        .find(|(_, mime)| *mime == essence)
        .map(|(ext, _)| *ext)
        .ok_or_else(|| ValidationError::UnsupportedMimeType {
            input: mime_type.to_owned(),
        })
}

/// Destination file name for a download: `<stem>.<ext>`.
pub fn download_file_name(stem: &FileStem, mime_type: &str) -> Result<String, ValidationError> {
    let extension = extension_for_mime_type(mime_type)?;
    Ok(format!("{}.{extension}", stem.as_str()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A local file prepared for a multipart upload.
pub struct MediaUpload {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    pub fn from_file(path: &Path, bytes: Vec<u8>) -> Self {
        let file_name = path
            .file_name()
            .map(|it| it.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_owned());
        Self {
            file_name,
            mime_type: mime_type_for_path(path),
            bytes,
        }
    }

    /// Text fields sent next to the `file` part.
    pub fn text_fields(&self) -> Vec<(String, String)> {
        vec![
            ("messaging_product".to_owned(), MESSAGING_PRODUCT.to_owned()),
            ("type".to_owned(), self.mime_type.to_owned()),
        ]
    }
}
