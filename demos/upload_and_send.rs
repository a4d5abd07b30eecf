mod common;

use wacloud::{Caption, MediaKind, MediaSource, Recipient, SendMedia};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_logging();
    let client = common::client_from_env()?;
    let to = Recipient::new(common::required_env("WHATSAPP_TO")?)?;
    let file = common::required_env("WHATSAPP_MEDIA_FILE")?;
    let kind: MediaKind = std::env::var("WHATSAPP_MEDIA_KIND")
        .unwrap_or_else(|_| "image".to_owned())
        .parse()?;

    let uploaded = client.upload_media(&file).await?;
    let Some(media_id) = uploaded.get("id").and_then(|it| it.as_str()) else {
        println!("upload rejected: {uploaded:#}");
        return Ok(());
    };
    println!("uploaded {file} as media {media_id}");

    let mut request = SendMedia::new(to, kind, MediaSource::resolve(media_id, false)?);
    if let Ok(caption) = std::env::var("WHATSAPP_CAPTION") {
        request = request.with_caption(Caption::new(caption)?);
    }
    let response = client.send_media(request).await?;
    println!("{response:#}");

    Ok(())
}
