use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Success,
    ConnectError,
    IoError,
    ParseError,
    ValidationError,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ConnectError => "connect_error",
            Self::IoError => "io_error",
            Self::ParseError => "parse_error",
            Self::ValidationError => "validation_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Flat `{kind, message}` outcome record for callers that want a uniform shape.
pub struct StatusRecord {
    pub kind: RecordKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A media file written to disk by `download_media`.
pub struct SavedMedia {
    pub path: PathBuf,
    pub bytes: u64,
}

impl SavedMedia {
    pub const MESSAGE: &'static str = "File saved successfully";

    pub fn record(&self) -> StatusRecord {
        StatusRecord {
            kind: RecordKind::Success,
            message: Self::MESSAGE.to_owned(),
        }
    }
}
