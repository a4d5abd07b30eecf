use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use wacloud::{
    AccessToken, Caption, FileStem, Latitude, Longitude, MediaId, MediaKind, MediaLink,
    MediaSource, MessageBody, OwnerId, Recipient, RecordKind, SendLocation, SendMedia, SendText,
    TextOptions, WhatsAppClient, WhatsAppError,
};
use wiremock::matchers::{body_json, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OWNER: &str = "104512345678901";
const TOKEN: &str = "test_token";

fn client_for(server_uri: &str) -> WhatsAppClient {
    WhatsAppClient::builder(AccessToken::new(TOKEN).unwrap(), OwnerId::new(OWNER).unwrap())
        .base_url(server_uri)
        .build()
        .unwrap()
}

fn to() -> Recipient {
    Recipient::new("919405235423").unwrap()
}

fn sent_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "messaging_product": "whatsapp",
        "contacts": [{"input": "919405235423", "wa_id": "919405235423"}],
        "messages": [{"id": "wamid.test"}]
    }))
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[tokio::test]
async fn send_location_posts_exact_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v14.0/{OWNER}/messages")))
        .and(header("authorization", "Bearer test_token"))
        .and(body_json(json!({
            "messaging_product": "whatsapp",
            "to": "919405235423",
            "type": "location",
            "location": {
                "longitude": "79.303360",
                "latitude": "19.970324",
                "name": "location",
                "address": "civil lines"
            }
        })))
        .respond_with(sent_response())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let request = SendLocation::new(
        to(),
        Longitude::new("79.303360").unwrap(),
        Latitude::new("19.970324").unwrap(),
    )
    .with_name("location")
    .with_address("civil lines");

    let response = client.send_location(request).await.unwrap();
    assert_eq!(response["messages"][0]["id"], json!("wamid.test"));
}

#[tokio::test]
async fn send_media_by_link_posts_nested_media_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v14.0/{OWNER}/messages")))
        .and(body_json(json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": "919405235423",
            "type": "image",
            "image": {
                "link": "https://i.imgur.com/FXvlGEd.jpeg",
                "caption": "this"
            }
        })))
        .respond_with(sent_response())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let request = SendMedia::new(
        to(),
        MediaKind::Image,
        MediaSource::resolve("https://i.imgur.com/FXvlGEd.jpeg", true).unwrap(),
    )
    .with_caption(Caption::new("this").unwrap());

    client.send_media(request).await.unwrap();
}

#[tokio::test]
async fn api_error_status_is_returned_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v14.0/{OWNER}/messages")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "(#131030) Recipient phone number not in allowed list",
                "type": "OAuthException",
                "code": 131030
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let request = SendText::new(
        to(),
        MessageBody::new("hello").unwrap(),
        TextOptions::default(),
    );

    let response = client.send_text(request).await.unwrap();
    assert_eq!(response["error"]["code"], json!(131030));
}

#[tokio::test]
async fn upload_media_sends_multipart_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v14.0/{OWNER}/media")))
        .and(header("authorization", "Bearer test_token"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1166846181421424"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("pic.png");
    std::fs::write(&file, b"not-really-a-png").unwrap();

    let client = client_for(&server.uri());
    let response = client.upload_media(&file).await.unwrap();
    assert_eq!(response["id"], json!("1166846181421424"));

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(body.contains("name=\"messaging_product\""));
    assert!(body.contains("whatsapp"));
    assert!(body.contains("filename=\"pic.png\""));
    assert!(body.contains("image/png"));
    assert!(body.contains("not-really-a-png"));
}

#[tokio::test]
async fn retrieve_media_url_is_plain_authenticated_get() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v14.0/1166846181421424"))
        .and(header("authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messaging_product": "whatsapp",
            "url": "https://lookaside.fbsbx.com/whatsapp_business/attachments/?mid=1",
            "mime_type": "image/jpeg",
            "sha256": "c0ffee",
            "file_size": 303833,
            "id": "1166846181421424"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let response = client
        .retrieve_media_url(&MediaId::new("1166846181421424").unwrap())
        .await
        .unwrap();
    assert_eq!(response["mime_type"], json!("image/jpeg"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn download_media_streams_body_to_named_file() {
    let server = MockServer::start().await;
    let content = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    Mock::given(method("GET"))
        .and(path("/attachments/pic"))
        .and(header("authorization", "Bearer test_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(content.clone()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&server.uri());
    let link = MediaLink::new(format!("{}/attachments/pic", server.uri())).unwrap();

    let saved = client
        .download_media(&FileStem::new("pic").unwrap(), dir.path(), &link, "image/jpeg")
        .await
        .unwrap();

    assert_eq!(saved.path, dir.path().join("pic.jpg"));
    assert_eq!(saved.bytes, content.len() as u64);
    assert_eq!(std::fs::read(&saved.path).unwrap(), content);
    assert_eq!(saved.record().kind, RecordKind::Success);
}

#[tokio::test]
async fn slow_server_yields_connect_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(sent_response().set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client =
        WhatsAppClient::builder(AccessToken::new(TOKEN).unwrap(), OwnerId::new(OWNER).unwrap())
            .base_url(server.uri())
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
    let request = SendText::new(
        to(),
        MessageBody::new("hello").unwrap(),
        TextOptions::default(),
    );

    let err = client.send_text(request).await.unwrap_err();
    assert!(matches!(err, WhatsAppError::Connect(_)));
    let record = err.record();
    assert_eq!(record.kind, RecordKind::ConnectError);
    assert!(!record.message.is_empty());
    assert_eq!(
        serde_json::to_value(&record).unwrap()["kind"],
        json!("connect_error")
    );
}

#[tokio::test]
async fn refused_connection_yields_connect_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = client_for(&format!("http://127.0.0.1:{port}"));

    let err = client
        .retrieve_media_url(&MediaId::new("555").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), RecordKind::ConnectError);
}

#[tokio::test]
async fn refused_download_leaves_existing_file_alone() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let dir = tempfile::tempdir().unwrap();
    let existing = dir.path().join("pic.jpg");
    std::fs::write(&existing, b"previously saved photo").unwrap();

    let client = client_for(&format!("http://127.0.0.1:{port}"));
    let link = MediaLink::new(format!("http://127.0.0.1:{port}/pic")).unwrap();
    let err = client
        .download_media(&FileStem::new("pic").unwrap(), dir.path(), &link, "image/jpeg")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), RecordKind::ConnectError);
    assert_eq!(std::fs::read(&existing).unwrap(), b"previously saved photo");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn injected_dispatch_captures_client_logs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(sent_response())
        .mount(&server)
        .await;

    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let client =
        WhatsAppClient::builder(AccessToken::new(TOKEN).unwrap(), OwnerId::new(OWNER).unwrap())
            .base_url(server.uri())
            .dispatch(tracing::Dispatch::new(subscriber))
            .build()
            .unwrap();
    let request = SendText::new(
        to(),
        MessageBody::new("hello").unwrap(),
        TextOptions::default(),
    );
    client.send_text(request).await.unwrap();

    let logs = buf.contents();
    assert!(logs.contains("posting message"), "logs: {logs}");
    assert!(logs.contains("send_text"), "logs: {logs}");
    assert!(!logs.contains(TOKEN), "logs: {logs}");
}
