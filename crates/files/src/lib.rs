//! Cards File Storage
//!
//! This crate validates and stores the images attached to cards.
//!
//! ## Design Principles
//!
//! - One flat uploads directory, created on startup when absent
//! - Only images are accepted: extension and declared content type must both name an
//!   allowed type
//! - Stored files are named `<unix-millis>-<original filename>`; two uploads of the same
//!   filename within one millisecond overwrite each other
//! - Files are never deleted when the card referencing them goes away
//!
//! ## Storage Layout
//!
//! ```text
//! uploads/
//! ├── 1767261600123-cat.png
//! └── 1767261612045-holiday.jpg
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use cards_files::{ImageUpload, UploadsService, DEFAULT_MAX_UPLOAD_BYTES};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = UploadsService::new(Path::new("uploads"), DEFAULT_MAX_UPLOAD_BYTES)?;
//! let upload = ImageUpload::new("cat.png", Some("image/png".into()), std::fs::read("cat.png")?);
//! let stored = service.store(&upload)?;
//! println!("served at {}", stored.url);
//! # Ok(())
//! # }
//! ```

mod constants;
mod files;

pub use constants::{
    ALLOWED_IMAGE_TYPES, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_UPLOADS_DIR, UPLOADS_URL_PREFIX,
};
pub use files::{ImageUpload, StoredImage, UploadsService};

/// Errors that can occur during upload operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Uploads path exists but cannot be used as a directory
    #[error("Invalid uploads directory: {0}")]
    InvalidUploadsDirectory(String),

    /// Extension or declared content type is not an allowed image type
    #[error("Only images are permitted")]
    NotAnImage,

    /// Upload exceeds the configured size limit
    #[error("File of {size} bytes exceeds the limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
