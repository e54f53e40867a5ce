//! AWS S3 asset store.
//!
//! Assets live at `s3://{bucket}/{prefix}/{name}` and are served from
//! `{public_prefix}/{name}` (typically a CDN in front of the bucket).

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};
use crate::storage::{AssetStore, public_path};

/// S3-based asset storage.
pub struct S3AssetStore {
    client: Client,
    bucket: String,
    prefix: String,
    public_prefix: String,
}

impl S3AssetStore {
    /// Create a new S3 store instance.
    pub fn new(
        client: Client,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        public_prefix: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
            public_prefix: public_prefix.into(),
        }
    }

    /// Create an S3 store using credentials from the environment.
    pub async fn from_env(bucket: &str, prefix: &str, public_prefix: &str) -> Result<Self> {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);
        Ok(Self::new(client, bucket, prefix, public_prefix))
    }

    fn key(&self, name: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        }
    }
}

/// Content type for an asset name, from its extension.
fn content_type(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl AssetStore for S3AssetStore {
    async fn exists(&self, name: &str) -> Result<bool> {
        let key = self.key(name);
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(AppError::S3(service_err.to_string()))
                }
            }
        }
    }

    /// A single PutObject either lands completely or not at all.
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let key = self.key(name);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes.to_vec()))
            .content_type(content_type(name))
            .send()
            .await
            .map_err(|e| AppError::S3(e.to_string()))?;

        log::info!("Wrote {} bytes to s3://{}/{}", bytes.len(), self.bucket, key);
        Ok(())
    }

    fn resolve(&self, name: &str) -> String {
        public_path(&self.public_prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("a.jpg"), "image/jpeg");
        assert_eq!(content_type("a.WEBP"), "image/webp");
        assert_eq!(content_type("a."), "application/octet-stream");
    }
}
