use serde::Serialize;

use crate::domain::validation::ValidationError;
use crate::domain::value::{
    Caption, Latitude, Longitude, MediaId, MediaKind, MediaLink, MessageBody, Recipient,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
/// `recipient_type` of an outbound message.
pub enum RecipientType {
    #[default]
    Individual,
    Group,
}

impl RecipientType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Group => "group",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    /// Render a link preview for the first URL in the body.
    pub preview_url: bool,
    pub recipient_type: RecipientType,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            preview_url: true,
            recipient_type: RecipientType::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SendText {
    to: Recipient,
    body: MessageBody,
    options: TextOptions,
}

impl SendText {
    pub fn new(to: Recipient, body: MessageBody, options: TextOptions) -> Self {
        Self { to, body, options }
    }

    pub fn to(&self) -> &Recipient {
        &self.to
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn options(&self) -> &TextOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Where the API fetches the media from.
pub enum MediaSource {
    /// Publicly reachable URL.
    Link(MediaLink),
    /// Id returned by a previous upload.
    Id(MediaId),
}

impl MediaSource {
    /// Interpret `reference` as a link when `by_link` is set, as a media id otherwise.
    pub fn resolve(reference: impl Into<String>, by_link: bool) -> Result<Self, ValidationError> {
        if by_link {
            Ok(Self::Link(MediaLink::new(reference)?))
        } else {
            Ok(Self::Id(MediaId::new(reference)?))
        }
    }
}

impl From<MediaLink> for MediaSource {
    fn from(value: MediaLink) -> Self {
        Self::Link(value)
    }
}

impl From<MediaId> for MediaSource {
    fn from(value: MediaId) -> Self {
        Self::Id(value)
    }
}

#[derive(Debug, Clone)]
pub struct SendMedia {
    to: Recipient,
    kind: MediaKind,
    source: MediaSource,
    caption: Option<Caption>,
    recipient_type: RecipientType,
}

impl SendMedia {
    pub fn new(to: Recipient, kind: MediaKind, source: impl Into<MediaSource>) -> Self {
        Self {
            to,
            kind,
            source: source.into(),
            caption: None,
            recipient_type: RecipientType::default(),
        }
    }

    /// Attach a caption. It is dropped on the wire for [`MediaKind::Audio`].
    pub fn with_caption(mut self, caption: Caption) -> Self {
        self.caption = Some(caption);
        self
    }

    pub fn with_recipient_type(mut self, recipient_type: RecipientType) -> Self {
        self.recipient_type = recipient_type;
        self
    }

    pub fn to(&self) -> &Recipient {
        &self.to
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    pub fn caption(&self) -> Option<&Caption> {
        self.caption.as_ref()
    }

    pub fn recipient_type(&self) -> RecipientType {
        self.recipient_type
    }
}

#[derive(Debug, Clone)]
pub struct SendLocation {
    to: Recipient,
    longitude: Longitude,
    latitude: Latitude,
    name: Option<String>,
    address: Option<String>,
}

impl SendLocation {
    pub fn new(to: Recipient, longitude: Longitude, latitude: Latitude) -> Self {
        Self {
            to,
            longitude,
            latitude,
            name: None,
            address: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn to(&self) -> &Recipient {
        &self.to
    }

    pub fn longitude(&self) -> &Longitude {
        &self.longitude
    }

    pub fn latitude(&self) -> &Latitude {
        &self.latitude
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

#[derive(Debug, Clone)]
/// Any message the client knows how to send.
pub enum OutboundMessage {
    Text(SendText),
    Media(SendMedia),
    Location(SendLocation),
}

impl OutboundMessage {
    pub fn to(&self) -> &Recipient {
        match self {
            Self::Text(text) => text.to(),
            Self::Media(media) => media.to(),
            Self::Location(location) => location.to(),
        }
    }
}

impl From<SendText> for OutboundMessage {
    fn from(value: SendText) -> Self {
        Self::Text(value)
    }
}

impl From<SendMedia> for OutboundMessage {
    fn from(value: SendMedia) -> Self {
        Self::Media(value)
    }
}

impl From<SendLocation> for OutboundMessage {
    fn from(value: SendLocation) -> Self {
        Self::Location(value)
    }
}
