//! Player check-ins: a timestamped selfie log, independent of the chain.
//!
//! ## Example
//!
//! ```no_run
//! use assassin::checkin::{
//!     CheckInManager, ImageUpload, LocalImageStore, MemoryCheckInRepository,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = CheckInManager::new(
//!         Arc::new(MemoryCheckInRepository::new()),
//!         Arc::new(LocalImageStore::new("uploads", "http://localhost:5001/uploads")),
//!     );
//!
//!     let selfie = ImageUpload {
//!         file_name: Some("me.jpg".to_string()),
//!         content_type: "image/jpeg".to_string(),
//!         bytes: std::fs::read("me.jpg")?,
//!     };
//!     manager.submit("Ana", selfie).await?;
//!
//!     for check_in in manager.list().await? {
//!         println!("{} at {}", check_in.name, check_in.submitted_at);
//!     }
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod repository;
pub mod storage;

pub use errors::{CheckInError, CheckInResult};
pub use manager::CheckInManager;
pub use models::{CheckIn, ImageUpload, StoredImage};
pub use repository::{CheckInRepository, MemoryCheckInRepository, PgCheckInRepository};
pub use storage::{ImageStore, LocalImageStore};
