use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    InvalidUrl { field: &'static str, input: String },
    InvalidPhoneNumber { input: String },
    InvalidCoordinate { field: &'static str, input: String },
    CoordinateOutOfRange { field: &'static str, limit: u8, input: String },
    InvalidFileName { input: String },
    UnsupportedMimeType { input: String },
    UnknownMediaKind { input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidUrl { field, input } => write!(f, "{field} is not a valid URL: {input}"),
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::InvalidCoordinate { field, input } => {
                write!(f, "{field} is not a decimal number: {input}")
            }
            Self::CoordinateOutOfRange {
                field,
                limit,
                input,
            } => {
                write!(
                    f,
                    "{field} out of range: {input} (expected -{limit}..={limit})"
                )
            }
            Self::InvalidFileName { input } => write!(f, "invalid file name: {input:?}"),
            Self::UnsupportedMimeType { input } => write!(f, "unsupported MIME type: {input}"),
            Self::UnknownMediaKind { input } => write!(f, "unknown media kind: {input}"),
        }
    }
}

impl std::error::Error for ValidationError {}
