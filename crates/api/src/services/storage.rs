//! Object storage for catalog materials.
//!
//! Clients never stream file bodies through the API: they receive a
//! short-lived URL and talk to the store directly. [`S3Storage`] presigns
//! against a bucket; [`LocalStorage`] hands out `file://` paths under a root
//! directory for development and tests.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use serde::Serialize;

use crate::config::{StorageBackend, StorageConfig};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Presigning failed: {0}")]
    Presign(String),

    #[error("Object store request failed: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// A URL the client uses directly against the object store.
#[derive(Debug, Clone, Serialize)]
pub struct PresignedUrl {
    pub url: String,
    /// HTTP method the URL is valid for.
    pub method: &'static str,
    pub expires_in: u64,
}

#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Short backend name reported by `/health`.
    fn name(&self) -> &'static str;

    /// URL for uploading `key` with the given content type.
    async fn upload_url(&self, key: &str, content_type: &str) -> Result<PresignedUrl, StorageError>;

    async fn download_url(&self, key: &str) -> Result<PresignedUrl, StorageError>;

    /// Remove `key`. Missing objects are not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Build the provider selected by configuration.
pub async fn from_config(config: &StorageConfig) -> Result<Box<dyn StorageProvider>, StorageError> {
    match config.backend {
        StorageBackend::Local => Ok(Box::new(LocalStorage::new(
            &config.local_root,
            config.presign_expiry_secs,
        ))),
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::Backend("S3 bucket is not configured".into()))?;
            Ok(Box::new(
                S3Storage::from_env(bucket, config.presign_expiry_secs).await,
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// S3
// ---------------------------------------------------------------------------

pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    expiry: Duration,
}

impl S3Storage {
    /// Load AWS credentials and region from the standard environment chain.
    pub async fn from_env(bucket: String, expiry_secs: u64) -> Self {
        let sdk_config = aws_config::load_from_env().await;
        Self {
            client: aws_sdk_s3::Client::new(&sdk_config),
            bucket,
            expiry: Duration::from_secs(expiry_secs),
        }
    }

    fn presigning(&self) -> Result<PresigningConfig, StorageError> {
        PresigningConfig::expires_in(self.expiry).map_err(|e| StorageError::Presign(e.to_string()))
    }
}

#[async_trait]
impl StorageProvider for S3Storage {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn upload_url(&self, key: &str, content_type: &str) -> Result<PresignedUrl, StorageError> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(self.presigning()?)
            .await
            .map_err(|e| StorageError::Presign(e.to_string()))?;
        Ok(PresignedUrl {
            url: request.uri().to_string(),
            method: "PUT",
            expires_in: self.expiry.as_secs(),
        })
    }

    async fn download_url(&self, key: &str) -> Result<PresignedUrl, StorageError> {
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(self.presigning()?)
            .await
            .map_err(|e| StorageError::Presign(e.to_string()))?;
        Ok(PresignedUrl {
            url: request.uri().to_string(),
            method: "GET",
            expires_in: self.expiry.as_secs(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Local directory
// ---------------------------------------------------------------------------

pub struct LocalStorage {
    root: PathBuf,
    expiry_secs: u64,
}

impl LocalStorage {
    pub fn new(root: impl AsRef<Path>, expiry_secs: u64) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            expiry_secs,
        }
    }

    /// Resolve `key` under the root, rejecting absolute paths and `..`.
    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let clean = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn file_url(&self, path: &Path, method: &'static str) -> PresignedUrl {
        PresignedUrl {
            url: format!("file://{}", path.display()),
            method,
            expires_in: self.expiry_secs,
        }
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn upload_url(&self, key: &str, _content_type: &str) -> Result<PresignedUrl, StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(self.file_url(&path, "PUT"))
    }

    async fn download_url(&self, key: &str) -> Result<PresignedUrl, StorageError> {
        let path = self.path_for(key)?;
        Ok(self.file_url(&path, "GET"))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
