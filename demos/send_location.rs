mod common;

use wacloud::{Latitude, Longitude, Recipient, SendLocation};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_logging();
    let client = common::client_from_env()?;
    let to = Recipient::new(common::required_env("WHATSAPP_TO")?)?;

    let request = SendLocation::new(
        to,
        Longitude::new("79.303360")?,
        Latitude::new("19.970324")?,
    )
    .with_name("location")
    .with_address("civil lines");

    let response = client.send_location(request).await?;
    println!("{response:#}");

    Ok(())
}
