//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{
    MediaSource, OutboundMessage, RecipientType, SendLocation, SendMedia, SendText, TextOptions,
};
pub use response::{RecordKind, SavedMedia, StatusRecord};
pub use validation::ValidationError;
pub use value::{
    AccessToken, ApiVersion, Caption, FileStem, Latitude, Longitude, MediaId, MediaKind,
    MediaLink, MessageBody, OwnerId, PhoneNumber, Recipient,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_rejects_empty() {
        assert!(matches!(
            AccessToken::new("   "),
            Err(ValidationError::Empty {
                field: AccessToken::FIELD
            })
        ));
    }

    #[test]
    fn owner_id_rejects_empty() {
        assert!(matches!(
            OwnerId::new(""),
            Err(ValidationError::Empty {
                field: OwnerId::FIELD
            })
        ));
    }

    #[test]
    fn message_body_preserves_whitespace() {
        let body = MessageBody::new("  hi there ").unwrap();
        assert_eq!(body.as_str(), "  hi there ");
        assert!(MessageBody::new(" \n ").is_err());
    }

    #[test]
    fn recipient_from_phone_number_drops_plus() {
        let pn = PhoneNumber::parse(Some(phonenumber::country::Id::US), " 650 253 0000 ").unwrap();
        assert_eq!(pn.raw(), "650 253 0000");
        assert_eq!(pn.e164(), "+16502530000");
        let to: Recipient = pn.into();
        assert_eq!(to.raw(), "16502530000");
    }

    #[test]
    fn phone_number_rejects_garbage() {
        assert!(matches!(
            PhoneNumber::parse(None, "hello"),
            Err(ValidationError::InvalidPhoneNumber { .. })
        ));
    }

    #[test]
    fn media_source_resolve_follows_flag() {
        let link = MediaSource::resolve("https://i.imgur.com/FXvlGEd.jpeg", true).unwrap();
        assert!(matches!(link, MediaSource::Link(_)));

        let id = MediaSource::resolve("1234567890", false).unwrap();
        assert_eq!(id, MediaSource::Id(MediaId::new("1234567890").unwrap()));

        assert!(MediaSource::resolve("1234567890", true).is_err());
    }

    #[test]
    fn text_options_default_to_preview_and_individual() {
        let options = TextOptions::default();
        assert!(options.preview_url);
        assert_eq!(options.recipient_type, RecipientType::Individual);
    }

    #[test]
    fn outbound_message_exposes_recipient() {
        let to = Recipient::new("919405235423").unwrap();
        let location = SendLocation::new(
            to.clone(),
            Longitude::new("79.303360").unwrap(),
            Latitude::new("19.970324").unwrap(),
        );
        let message = OutboundMessage::from(location);
        assert_eq!(message.to(), &to);
    }
}
