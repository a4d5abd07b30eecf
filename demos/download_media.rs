mod common;

use wacloud::{FileStem, MediaId, MediaLink};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_logging();
    let client = common::client_from_env()?;
    let media_id = MediaId::new(common::required_env("WHATSAPP_MEDIA_ID")?)?;
    let dest_dir = std::env::var("WHATSAPP_DOWNLOAD_DIR").unwrap_or_else(|_| ".".to_owned());

    let metadata = client.retrieve_media_url(&media_id).await?;
    let (Some(url), Some(mime_type)) = (
        metadata.get("url").and_then(|it| it.as_str()),
        metadata.get("mime_type").and_then(|it| it.as_str()),
    ) else {
        println!("metadata lookup rejected: {metadata:#}");
        return Ok(());
    };

    let saved = client
        .download_media(
            &FileStem::new(media_id.as_str())?,
            &dest_dir,
            &MediaLink::new(url)?,
            mime_type,
        )
        .await?;
    println!(
        "{} ({} bytes at {})",
        saved.record().message,
        saved.bytes,
        saved.path.display()
    );

    Ok(())
}
