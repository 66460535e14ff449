//! Check-in manager tying image storage to the check-in log.

use super::errors::{CheckInError, CheckInResult};
use super::models::{CheckIn, ImageUpload};
use super::repository::CheckInRepository;
use super::storage::ImageStore;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Check-in manager
#[derive(Clone)]
pub struct CheckInManager {
    repository: Arc<dyn CheckInRepository>,
    images: Arc<dyn ImageStore>,
}

impl CheckInManager {
    /// Create a new check-in manager
    ///
    /// # Arguments
    ///
    /// * `repository` - Where check-ins are recorded
    /// * `images` - Where selfies are stored
    pub fn new(repository: Arc<dyn CheckInRepository>, images: Arc<dyn ImageStore>) -> Self {
        Self { repository, images }
    }

    /// Store the selfie and record a check-in stamped with the current time
    ///
    /// # Errors
    ///
    /// * `CheckInError::EmptyName` - Blank name
    /// * `CheckInError::NotAnImage` - Content type is not `image/*`
    /// * `CheckInError::EmptyImage` - No image bytes
    /// * `CheckInError::Storage` / `CheckInError::Database` - Backend failure
    pub async fn submit(&self, name: &str, upload: ImageUpload) -> CheckInResult<CheckIn> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CheckInError::EmptyName);
        }
        if !upload.content_type.starts_with("image/") {
            return Err(CheckInError::NotAnImage(upload.content_type));
        }
        if upload.bytes.is_empty() {
            return Err(CheckInError::EmptyImage);
        }

        let stored = self.images.put(&upload).await?;
        let check_in = CheckIn {
            id: Uuid::new_v4(),
            name: name.to_string(),
            image_url: stored.url,
            submitted_at: Utc::now(),
        };
        self.repository.insert(&check_in).await?;

        log::info!("Check-in recorded for {}", check_in.name);
        Ok(check_in)
    }

    /// All check-ins, oldest first
    pub async fn list(&self) -> CheckInResult<Vec<CheckIn>> {
        self.repository.list().await
    }

    /// Check that the check-in store answers, without reading it
    pub async fn ping(&self) -> CheckInResult<()> {
        self.repository.ping().await
    }
}
