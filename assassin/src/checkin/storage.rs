//! Image storage backends.

use super::errors::CheckInResult;
use super::models::{ImageUpload, StoredImage};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Trait for image storage operations
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an image and return its public location
    async fn put(&self, upload: &ImageUpload) -> CheckInResult<StoredImage>;
}

/// Stores images as content-addressed files in a local directory
pub struct LocalImageStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    /// Create a store writing under `root` and served from `public_base_url`
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Directory images are written to
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn put(&self, upload: &ImageUpload) -> CheckInResult<StoredImage> {
        let key = storage_key(upload);
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(&key);
        // Same content means same key, so an existing file is already correct.
        if tokio::fs::try_exists(&path).await? {
            log::debug!("Image {} already stored", key);
        } else {
            tokio::fs::write(&path, &upload.bytes).await?;
        }

        Ok(StoredImage {
            url: format!("{}/{}", self.public_base_url, key),
            key,
        })
    }
}

/// SHA-256 of the content plus an extension derived from the upload
pub fn storage_key(upload: &ImageUpload) -> String {
    let digest = Sha256::digest(&upload.bytes);
    format!("{}.{}", hex::encode(digest), extension(upload))
}

fn extension(upload: &ImageUpload) -> String {
    let from_type = match upload.content_type.as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    };
    if let Some(ext) = from_type {
        return ext.to_string();
    }

    upload
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "img".to_string())
}
