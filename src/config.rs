//! Environment-based configuration for the S3 sink
//!
//! All settings are required and loaded once before Start; a missing
//! variable is a startup failure, not a defaulted value.

use crate::{Error, Result};
use object_store::aws::AmazonS3Builder;
use object_store::ObjectStore;
use std::sync::Arc;
use tracing::info;

/// Immutable sink settings, loaded once for the process lifetime.
#[derive(Debug, Clone)]
pub struct Settings {
    /// AWS region the bucket lives in
    pub region: String,
    /// AWS access key id
    pub access_key: String,
    /// AWS secret access key
    pub secret_key: String,
    /// Destination bucket
    pub bucket: String,
    /// Filename suffix for the uploaded object key
    pub filename: String,
    /// Custom endpoint for S3-compatible stores (MinIO, LocalStack)
    pub endpoint: Option<String>,
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// Required variables: `AWS_REGION`, `AWS_ACCESS_KEY_ID`,
    /// `AWS_SECRET_ACCESS_KEY`, `AWS_BUCKET`, `AWS_FILENAME`.
    /// Optional: `AWS_ENDPOINT` for S3-compatible stores.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            region: require_env("AWS_REGION")?,
            access_key: require_env("AWS_ACCESS_KEY_ID")?,
            secret_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            bucket: require_env("AWS_BUCKET")?,
            filename: require_env("AWS_FILENAME")?,
            endpoint: std::env::var("AWS_ENDPOINT")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        })
    }

    /// Build the S3 client for these settings.
    pub fn build_store(&self) -> Result<Arc<dyn ObjectStore>> {
        info!(
            bucket = %self.bucket,
            region = %self.region,
            "Building S3 object store"
        );

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&self.bucket)
            .with_region(&self.region)
            .with_access_key_id(&self.access_key)
            .with_secret_access_key(&self.secret_key);

        if let Some(endpoint) = &self.endpoint {
            info!("Using custom S3 endpoint: {}", endpoint);
            builder = builder.with_endpoint(endpoint).with_allow_http(true);
        }

        Ok(Arc::new(builder.build()?))
    }
}

fn require_env(name: &str) -> Result<String> {
    let value = std::env::var(name)
        .map_err(|_| Error::Config(format!("{name} is required and was not set")))?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(Error::Config(format!("{name} is required and was empty")));
    }
    Ok(value)
}
