use std::fmt;

use phonenumber::country;
use serde::Serialize;

use crate::domain::validation::ValidationError;

/// Trim `value` and reject it when nothing is left.
fn non_empty_trimmed(field: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_owned())
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// Graph API access token sent as a bearer credential.
///
/// Invariant: non-empty after trimming. `Debug` never prints the token.
pub struct AccessToken(String);

impl AccessToken {
    pub const FIELD: &'static str = "access_token";

    /// Create a validated [`AccessToken`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self(non_empty_trimmed(Self::FIELD, value.into())?))
    }

    /// Borrow the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Id of the business phone number that owns the messaging endpoints.
///
/// The vendor calls this the "phone number id"; older API revisions used a
/// "WA id" in the same URL position.
///
/// Invariant: non-empty after trimming.
pub struct OwnerId(String);

impl OwnerId {
    pub const FIELD: &'static str = "phone_number_id";

    /// Create a validated [`OwnerId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self(non_empty_trimmed(Self::FIELD, value.into())?))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Graph API version path segment, e.g. `v14.0`.
pub struct ApiVersion(String);

impl ApiVersion {
    pub const FIELD: &'static str = "api_version";

    /// Create a validated version; surrounding slashes are stripped.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let stripped = value.trim().trim_matches('/');
        if stripped.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(stripped.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self("v14.0".to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
/// Recipient as sent to the API (`to`): phone number with country code.
///
/// Invariant: non-empty after trimming. No normalization is applied; parse into
/// [`PhoneNumber`] and convert if you want the digits-only E.164 form.
pub struct Recipient(String);

impl Recipient {
    pub const FIELD: &'static str = "to";

    /// Create a validated (non-empty) recipient.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self(non_empty_trimmed(Self::FIELD, value.into())?))
    }

    /// Raw (trimmed) value as sent to the API.
    pub fn raw(&self) -> &str {
        &self.0
    }
}

impl From<PhoneNumber> for Recipient {
    /// The Cloud API wants the international number without the leading `+`.
    fn from(value: PhoneNumber) -> Self {
        Self(value.e164.trim_start_matches('+').to_owned())
    }
}

#[derive(Debug, Clone)]
/// Parsed phone number with an E.164 representation.
///
/// Equality and hashing are based on the E.164 form.
pub struct PhoneNumber {
    raw: String,
    e164: String,
}

impl PhoneNumber {
    pub const FIELD: &'static str = "to";

    /// Parse and normalize a phone number into E.164.
    ///
    /// `default_region` is used when the input does not contain an explicit country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let raw = non_empty_trimmed(Self::FIELD, input.into())?;

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;
        if !phonenumber::is_valid(&parsed) {
            return Err(ValidationError::InvalidPhoneNumber { input: raw });
        }

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self { raw, e164 })
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized E.164 representation (with `+`).
    pub fn e164(&self) -> &str {
        &self.e164
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneNumber {}

impl std::hash::Hash for PhoneNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
/// Text message body (`text.body`).
///
/// Invariant: non-empty after trimming. The original value (including whitespace) is preserved.
pub struct MessageBody(String);

impl MessageBody {
    pub const FIELD: &'static str = "body";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
/// Caption attached to image, video and document messages.
pub struct Caption(String);

impl Caption {
    pub const FIELD: &'static str = "caption";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
/// Media id issued by the API after an upload.
///
/// Invariant: non-empty after trimming.
pub struct MediaId(String);

impl MediaId {
    pub const FIELD: &'static str = "id";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self(non_empty_trimmed(Self::FIELD, value.into())?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
/// Absolute `http(s)` URL of a media object.
pub struct MediaLink(String);

impl MediaLink {
    pub const FIELD: &'static str = "link";

    /// Create a link; the value must parse as an absolute `http` or `https` URL.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let trimmed = non_empty_trimmed(Self::FIELD, value.into())?;
        match url::Url::parse(&trimmed) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(Self(trimmed)),
            _ => Err(ValidationError::InvalidUrl {
                field: Self::FIELD,
                input: trimmed,
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Kind of media message.
///
/// The wire key doubles as the message `type` and as the name of the object
/// that carries the media reference (`{"type": "image", "image": {...}}`).
pub enum MediaKind {
    Audio,
    Document,
    Image,
    Video,
}

impl MediaKind {
    /// Key used for `type` and for the nested media object.
    pub fn wire_key(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// Audio messages reject captions.
    pub fn supports_caption(self) -> bool {
        !matches!(self, Self::Audio)
    }
}

impl std::str::FromStr for MediaKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "audio" => Ok(Self::Audio),
            "document" => Ok(Self::Document),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "" => Err(ValidationError::Empty { field: "type" }),
            _ => Err(ValidationError::UnknownMediaKind {
                input: s.to_owned(),
            }),
        }
    }
}

/// Parse a decimal-degree coordinate, keeping the caller's spelling.
fn coordinate(field: &'static str, limit: u8, value: String) -> Result<String, ValidationError> {
    let trimmed = non_empty_trimmed(field, value)?;
    let degrees = trimmed
        .parse::<f64>()
        .ok()
        .filter(|it| it.is_finite())
        .ok_or_else(|| ValidationError::InvalidCoordinate {
            field,
            input: trimmed.clone(),
        })?;
    if degrees.abs() > f64::from(limit) {
        return Err(ValidationError::CoordinateOutOfRange {
            field,
            limit,
            input: trimmed,
        });
    }
    Ok(trimmed)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
/// Longitude in decimal degrees, sent exactly as given.
///
/// Invariant: parses as a finite number within `-180..=180`.
pub struct Longitude(String);

impl Longitude {
    pub const FIELD: &'static str = "longitude";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self(coordinate(Self::FIELD, 180, value.into())?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
/// Latitude in decimal degrees, sent exactly as given.
///
/// Invariant: parses as a finite number within `-90..=90`.
pub struct Latitude(String);

impl Latitude {
    pub const FIELD: &'static str = "latitude";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self(coordinate(Self::FIELD, 90, value.into())?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Base name of a downloaded file, without extension.
///
/// Invariant: non-empty, no path separators, not `.` or `..`.
pub struct FileStem(String);

impl FileStem {
    pub const FIELD: &'static str = "file_name";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let trimmed = non_empty_trimmed(Self::FIELD, value.into())?;
        if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
            return Err(ValidationError::InvalidFileName { input: trimmed });
        }
        Ok(Self(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
