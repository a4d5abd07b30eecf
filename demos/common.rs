use std::io;

use wacloud::{AccessToken, OwnerId, WhatsAppClient};

pub fn required_env(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

pub fn client_from_env() -> Result<WhatsAppClient, Box<dyn std::error::Error>> {
    let token = AccessToken::new(required_env("WHATSAPP_TOKEN")?)?;
    let owner_id = OwnerId::new(required_env("WHATSAPP_PHONE_NUMBER_ID")?)?;
    Ok(WhatsAppClient::new(token, owner_id))
}
