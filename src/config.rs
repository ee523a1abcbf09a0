mod sink;
mod storage;

pub use self::sink::SinkConfig;
pub use self::storage::StorageConfig;

use weblogs_cdn_logs::ErrorPolicy;
use weblogs_env_vars::{var, var_parsed};

/// Everything a processing run needs to know about its environment.
///
/// The configuration is read once on startup and then passed down
/// explicitly, nothing below [`Config::from_env`] looks at environment
/// variables.
#[derive(Debug)]
pub struct Config {
    pub storage: StorageConfig,
    pub sink: SinkConfig,
    /// Region of the log bucket, overriding the one from the notification.
    pub region: Option<String>,
    pub error_policy: ErrorPolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let storage = StorageConfig::from_env()?;
        let sink = SinkConfig::from_env()?;
        let region = var("AWS_S3_REGION")?;
        let error_policy = var_parsed("ERROR_POLICY")?.unwrap_or_default();

        Ok(Self {
            storage,
            sink,
            region,
            error_policy,
        })
    }
}
