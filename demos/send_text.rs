mod common;

use wacloud::{MessageBody, Recipient, SendText, TextOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_logging();
    let client = common::client_from_env()?;
    let to = Recipient::new(common::required_env("WHATSAPP_TO")?)?;
    let message = std::env::var("WHATSAPP_MESSAGE")
        .unwrap_or_else(|_| "Hello from the wacloud demo.".to_owned());

    let request = SendText::new(to, MessageBody::new(message)?, TextOptions::default());
    match client.send_text(request).await {
        Ok(response) => println!("{response:#}"),
        Err(err) => println!("{}", serde_json::to_string(&err.record())?),
    }

    Ok(())
}
