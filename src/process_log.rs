use crate::config::{Config, StorageConfig};
use crate::message::{Message, Record};
use anyhow::{Context, anyhow};
use object_store::ObjectStore;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use std::error::Error as StdError;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, instrument, warn};
use weblogs_cdn_logs::{Decompressor, ErrorPolicy, RowError, build_payload};
use weblogs_elastic::{BulkIndexClient, BulkResponse, SinkError};

type BoxedError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ProcessLogError {
    /// The log file could not be downloaded or decompressed.
    #[error("Failed to fetch log file {path}: {source}")]
    Fetch { path: String, source: BoxedError },
    #[error("Failed to parse log file {path}: {source}")]
    MalformedRecord {
        path: String,
        source: weblogs_cdn_logs::Error,
    },
    #[error("Failed to encode log file {path}: {source}")]
    Encoding {
        path: String,
        source: weblogs_cdn_logs::Error,
    },
    #[error("Failed to send log file {path} to the bulk endpoint: {source}")]
    Sink { path: String, source: SinkError },
}

/// What happened to a single log file.
#[derive(Debug)]
pub struct ProcessLogOutcome {
    pub path: String,
    pub records: usize,
    pub row_errors: Vec<RowError>,
    /// `None` if the file contained no records and nothing was sent.
    pub response: Option<BulkResponse>,
}

/// Loads a compressed log file from an object store (aka. S3), converts its
/// records into a bulk indexing request and sends that to the search
/// cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessLog {
    pub region: String,
    pub bucket: String,
    pub path: String,
}

impl ProcessLog {
    pub fn new(region: String, bucket: String, path: String) -> Self {
        Self {
            region,
            bucket,
            path,
        }
    }

    /// Builds the job for a notification record, with the object key
    /// already decoded.
    pub fn from_record(record: &Record, region: Option<&str>) -> anyhow::Result<Self> {
        let key = &record.s3.object.key;
        let path = record
            .object_path()
            .with_context(|| format!("Failed to parse object key: {key:?}"))?;

        let region = region.unwrap_or(&record.aws_region);
        let bucket = &record.s3.bucket.name;

        Ok(Self::new(
            region.to_string(),
            bucket.to_string(),
            path.as_ref().to_owned(),
        ))
    }

    /// Builds an object store based on the [StorageConfig] and the `region`
    /// and `bucket` fields of the [ProcessLog] struct.
    ///
    /// If the passed in [StorageConfig] is using local file or in-memory
    /// storage the `region` and `bucket` fields are ignored.
    pub fn build_store(&self, config: &StorageConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
        match config {
            StorageConfig::S3 {
                access_key,
                secret_key,
            } => {
                use secrecy::ExposeSecret;

                let store = AmazonS3Builder::new()
                    .with_region(&self.region)
                    .with_bucket_name(&self.bucket)
                    .with_access_key_id(access_key)
                    .with_secret_access_key(secret_key.expose_secret())
                    .build()?;

                Ok(Arc::new(store))
            }
            StorageConfig::Local { path } => {
                Ok(Arc::new(LocalFileSystem::new_with_prefix(path)?))
            }
            StorageConfig::Memory => Ok(Arc::new(InMemory::new())),
        }
    }

    /// Processes the log file with the given object store and bulk client.
    ///
    /// The object is streamed and decompressed on the fly. The stream is
    /// owned by this future and released on every return path.
    #[instrument(skip_all, fields(path = %self.path))]
    pub async fn run(
        &self,
        store: Arc<dyn ObjectStore>,
        client: &dyn BulkIndexClient,
        policy: ErrorPolicy,
    ) -> Result<ProcessLogOutcome, ProcessLogError> {
        let path = object_store::path::Path::parse(&self.path);
        let path = path.map_err(|e| self.fetch_error(e))?;

        let meta = store.head(&path).await;
        let meta = meta.map_err(|e| self.fetch_error(e))?;

        let reader = object_store::buffered::BufReader::new(store, &meta);
        let decompressor = Decompressor::from_extension(reader, path.extension());
        let decompressor = decompressor.map_err(|e| self.fetch_error(e))?;
        let reader = BufReader::new(decompressor);

        let summary = build_payload(reader, policy)
            .await
            .map_err(|e| self.payload_error(e))?;

        let records = summary.payload.len();
        let num_row_errors = summary.row_errors.len();
        if num_row_errors > 0 {
            warn!("Skipped {num_row_errors} malformed lines in log file: {path}");
        }

        if summary.payload.is_empty() {
            info!("No records found in log file: {path}");
            return Ok(ProcessLogOutcome {
                path: self.path.clone(),
                records,
                row_errors: summary.row_errors,
                response: None,
            });
        }

        info!("Log file: {path}");
        info!("Number of records: {records}");
        info!("Target indices: {:?}", summary.payload.indices());

        let response = client
            .send_bulk(summary.payload.into_string())
            .await
            .map_err(|source| ProcessLogError::Sink {
                path: self.path.clone(),
                source,
            })?;

        info!("Bulk response status: {}", response.status);
        if response.errors {
            let failed_items = response.failed_items;
            warn!("Bulk endpoint rejected {failed_items} of {records} documents from {path}");
        }

        Ok(ProcessLogOutcome {
            path: self.path.clone(),
            records,
            row_errors: summary.row_errors,
            response: Some(response),
        })
    }

    fn fetch_error(&self, source: impl Into<BoxedError>) -> ProcessLogError {
        ProcessLogError::Fetch {
            path: self.path.clone(),
            source: source.into(),
        }
    }

    fn payload_error(&self, error: weblogs_cdn_logs::Error) -> ProcessLogError {
        let path = self.path.clone();
        match error {
            weblogs_cdn_logs::Error::Read(source) => ProcessLogError::Fetch {
                path,
                source: source.into(),
            },
            source @ weblogs_cdn_logs::Error::MalformedRecord { .. } => {
                ProcessLogError::MalformedRecord { path, source }
            }
            source @ weblogs_cdn_logs::Error::Encoding { .. } => {
                ProcessLogError::Encoding { path, source }
            }
        }
    }
}

/// Processes every log file named in a notification, in order.
///
/// The first failing file ends the run, files after it are not processed.
pub async fn process_message(
    message: &Message,
    config: &Config,
    client: &dyn BulkIndexClient,
) -> anyhow::Result<Vec<ProcessLogOutcome>> {
    if message.records.is_empty() {
        return Err(anyhow!("Notification contains no records"));
    }

    let mut outcomes = Vec::with_capacity(message.records.len());
    for record in &message.records {
        let job = ProcessLog::from_record(record, config.region.as_deref())?;
        info!("New log file detected: {}", job.path);

        // The store is rebuilt for each file because we don't want to assume
        // that all log files live in the same AWS region or bucket.
        let store = job
            .build_store(&config.storage)
            .context("Failed to build object store")?;

        outcomes.push(job.run(store, client, config.error_policy).await?);
    }

    Ok(outcomes)
}
