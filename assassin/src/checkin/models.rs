//! Check-in data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A timestamped selfie submitted by a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub submitted_at: DateTime<Utc>,
}

/// Raw image as received from the client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Where an image ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Storage key, unique per content
    pub key: String,
    /// Public URL the image is served from
    pub url: String,
}
