use anyhow::Context;
use secrecy::SecretString;
use url::Url;
use weblogs_elastic::RealBulkIndexClient;
use weblogs_env_vars::{required_secret, required_var, required_var_parsed};

/// Bulk indexing endpoint and the credentials for it.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Full URL of the bulk endpoint, e.g. `https://search.example.com/_bulk`.
    pub url: Url,
    pub username: String,
    pub password: SecretString,
}

impl SinkConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            url: required_var_parsed("ELASTIC_URL")?,
            username: required_var("ELASTIC_USER")?,
            password: required_secret("ELASTIC_PASSWORD")?,
        })
    }

    pub fn build_client(&self) -> anyhow::Result<RealBulkIndexClient> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("weblogs/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(RealBulkIndexClient::new(
            client,
            self.url.clone(),
            self.username.clone(),
            self.password.clone(),
        ))
    }
}
