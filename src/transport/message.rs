use serde_json::{Map, Value, json};

use crate::domain::{MediaSource, OutboundMessage, SendLocation, SendMedia, SendText};

pub const MESSAGING_PRODUCT: &str = "whatsapp";

pub fn encode_text_payload(request: &SendText) -> Value {
    json!({
        "messaging_product": MESSAGING_PRODUCT,
        "recipient_type": request.options().recipient_type.as_str(),
        "to": request.to().raw(),
        "type": "text",
        "text": {
            "preview_url": request.options().preview_url,
            "body": request.body().as_str(),
        },
    })
}

/// The media object sits under its kind key, e.g. `{"type": "image", "image": {...}}`.
pub fn encode_media_payload(request: &SendMedia) -> Value {
    let kind = request.kind();
    let mut object = Map::new();
    match request.source() {
        MediaSource::Link(link) => object.insert("link".into(), link.as_str().into()),
        MediaSource::Id(id) => object.insert("id".into(), id.as_str().into()),
    };
    if let Some(caption) = request.caption().filter(|_| kind.supports_caption()) {
        object.insert("caption".into(), caption.as_str().into());
    }

    let mut payload = envelope(request.to().raw(), kind.wire_key());
    payload.insert(
        "recipient_type".into(),
        request.recipient_type().as_str().into(),
    );
    payload.insert(kind.wire_key().into(), Value::Object(object));
    Value::Object(payload)
}

pub fn encode_location_payload(request: &SendLocation) -> Value {
    let mut location = Map::new();
    location.insert("longitude".into(), request.longitude().as_str().into());
    location.insert("latitude".into(), request.latitude().as_str().into());
    if let Some(name) = request.name() {
        location.insert("name".into(), name.into());
    }
    if let Some(address) = request.address() {
        location.insert("address".into(), address.into());
    }

    let mut payload = envelope(request.to().raw(), "location");
    payload.insert("location".into(), Value::Object(location));
    Value::Object(payload)
}

pub fn encode_outbound_payload(message: &OutboundMessage) -> Value {
    match message {
        OutboundMessage::Text(text) => encode_text_payload(text),
        OutboundMessage::Media(media) => encode_media_payload(media),
        OutboundMessage::Location(location) => encode_location_payload(location),
    }
}

fn envelope(to: &str, kind: &str) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("messaging_product".into(), MESSAGING_PRODUCT.into());
    payload.insert("to".into(), to.into());
    payload.insert("type".into(), kind.into());
    payload
}
