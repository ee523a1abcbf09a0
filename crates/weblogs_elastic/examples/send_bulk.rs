use anyhow::{Result, anyhow};
use secrecy::SecretString;
use std::env;
use url::Url;
use weblogs_elastic::{BulkIndexClient, RealBulkIndexClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = env::args().skip(1);
    let url = args.next().ok_or_else(|| anyhow!("Missing bulk endpoint URL"))?;
    let username = args.next().ok_or_else(|| anyhow!("Missing username"))?;
    let password = args.next().ok_or_else(|| anyhow!("Missing password"))?;

    let client = RealBulkIndexClient::new(
        reqwest::Client::new(),
        Url::parse(&url)?,
        username,
        SecretString::from(password),
    );

    let payload = concat!(
        r#"{"index":{"_index":"weblogs-test"}}"#,
        "\n",
        r#"{"timestamp":"2024-01-15 12:30:00","bot_detected":"Human"}"#,
        "\n",
    );

    let response = client.send_bulk(payload.to_string()).await?;
    println!("{response:?}");

    Ok(())
}
