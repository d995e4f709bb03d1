//! Upload validation and storage
//!
//! This module provides the [`UploadsService`], which decides whether an incoming file is an
//! acceptable image and writes accepted files into the uploads directory.
//!
//! # Validation
//!
//! An upload is accepted only when all of the following hold:
//!
//! - its size does not exceed the service limit
//! - the extension of its filename is one of [`ALLOWED_IMAGE_TYPES`] (case-insensitive)
//! - its declared content type is `image/<subtype>` with `<subtype>` in the same set
//!
//! The bytes themselves are sniffed for a media type, but only to record and log it. A
//! mismatch between sniffed and declared type never rejects the upload.
//!
//! # Naming
//!
//! Files are written as `<unix-millis>-<basename>`, where `<basename>` is the client-supplied
//! filename with any directory components stripped. The name is not guaranteed unique.

use crate::{FilesError, ALLOWED_IMAGE_TYPES, UPLOADS_URL_PREFIX};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// An image received from a client, held in memory until it is validated and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Filename as sent by the client
    pub original_filename: String,

    /// Content type as declared by the client, if any
    pub content_type: Option<String>,

    /// File content
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        original_filename: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            original_filename: original_filename.into(),
            content_type,
            bytes,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Last component of the client filename, accepting both `/` and `\` as separators.
    pub fn base_name(&self) -> &str {
        self.original_filename
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or_default()
    }
}

/// Record of an image written to the uploads directory
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct StoredImage {
    /// Generated filename within the uploads directory
    pub file_name: String,

    /// Absolute path of the written file
    pub path: PathBuf,

    /// URL path the file is served under, e.g. `/uploads/1767261600123-cat.png`
    pub url: String,

    /// Size of the file in bytes
    pub size_bytes: u64,

    /// Media type sniffed from the content, if recognised
    pub media_type: Option<String>,

    /// UTC timestamp used to name the file
    pub stored_at: DateTime<Utc>,
}

/// Service that validates uploads and stores them in a single directory
#[derive(Debug)]
pub struct UploadsService {
    /// Canonicalised uploads directory
    directory: PathBuf,

    /// Largest accepted upload, in bytes
    max_bytes: u64,
}

impl UploadsService {
    /// Creates a new `UploadsService`, creating the uploads directory if it is absent
    ///
    /// # Arguments
    ///
    /// * `directory` - Directory stored images are written to
    /// * `max_bytes` - Largest accepted upload, in bytes
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - The path exists but is not a directory
    /// - The directory cannot be created (I/O)
    /// - Path canonicalisation fails
    pub fn new(directory: &Path, max_bytes: u64) -> Result<Self, FilesError> {
        if directory.exists() && !directory.is_dir() {
            return Err(FilesError::InvalidUploadsDirectory(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        fs::create_dir_all(directory).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create uploads directory {}: {}",
                    directory.display(),
                    e
                ),
            ))
        })?;

        let directory = directory.canonicalize().map_err(|e| {
            FilesError::InvalidUploadsDirectory(format!(
                "Cannot canonicalize path {}: {}",
                directory.display(),
                e
            ))
        })?;

        Ok(Self {
            directory,
            max_bytes,
        })
    }

    /// Checks an upload against the size limit and the image allow-list
    ///
    /// # Errors
    ///
    /// - `FilesError::TooLarge` if the upload exceeds the size limit
    /// - `FilesError::NotAnImage` if the extension or declared content type is not allowed
    pub fn validate(&self, upload: &ImageUpload) -> Result<(), FilesError> {
        let size = upload.size_bytes();
        if size > self.max_bytes {
            return Err(FilesError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        if !extension_allowed(upload.base_name())
            || !content_type_allowed(upload.content_type.as_deref())
        {
            return Err(FilesError::NotAnImage);
        }

        Ok(())
    }

    /// Validates and writes an upload, naming it after the current time
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if validation fails or the file cannot be written.
    pub fn store(&self, upload: &ImageUpload) -> Result<StoredImage, FilesError> {
        self.store_at(upload, Utc::now())
    }

    /// Validates and writes an upload, naming it after `stored_at`
    ///
    /// An existing file with the same generated name is overwritten.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if validation fails or the file cannot be written.
    pub fn store_at(
        &self,
        upload: &ImageUpload,
        stored_at: DateTime<Utc>,
    ) -> Result<StoredImage, FilesError> {
        self.validate(upload)?;

        let file_name = Self::file_name_for(upload.base_name(), stored_at);
        let path = self.directory.join(&file_name);

        fs::write(&path, &upload.bytes).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write file to {}: {}", path.display(), e),
            ))
        })?;

        // Detect media type (best-effort)
        let media_type = infer::get(&upload.bytes).map(|kind| kind.mime_type().to_string());
        if let (Some(detected), Some(declared)) =
            (media_type.as_deref(), upload.content_type.as_deref())
        {
            if !content_type_essence(declared).eq_ignore_ascii_case(detected) {
                tracing::warn!(
                    "declared content type {} does not match sniffed {} for {}",
                    declared,
                    detected,
                    file_name
                );
            }
        }

        tracing::debug!("stored upload {} ({} bytes)", path.display(), upload.size_bytes());

        Ok(StoredImage {
            url: Self::url_for(&file_name),
            file_name,
            path,
            size_bytes: upload.size_bytes(),
            media_type,
            stored_at,
        })
    }

    /// Deletes a previously stored image
    ///
    /// # Errors
    ///
    /// - `FilesError::InvalidUploadsDirectory` if the path lies outside the uploads directory
    /// - `FilesError::Io` if the file cannot be removed
    pub fn remove(&self, stored: &StoredImage) -> Result<(), FilesError> {
        if stored.path.parent() != Some(self.directory.as_path()) {
            return Err(FilesError::InvalidUploadsDirectory(format!(
                "Refusing to remove file outside uploads directory: {}",
                stored.path.display()
            )));
        }

        fs::remove_file(&stored.path)?;
        tracing::debug!("removed upload {}", stored.path.display());
        Ok(())
    }

    /// Generated filename for an upload stored at `stored_at`.
    pub fn file_name_for(base_name: &str, stored_at: DateTime<Utc>) -> String {
        format!("{}-{}", stored_at.timestamp_millis(), base_name)
    }

    /// URL path a stored file is served under.
    pub fn url_for(file_name: &str) -> String {
        format!("{}/{}", UPLOADS_URL_PREFIX, file_name)
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }
}

fn content_type_essence(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}

fn extension_allowed(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_IMAGE_TYPES.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn content_type_allowed(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };

    let essence = content_type_essence(content_type).to_ascii_lowercase();
    essence
        .strip_prefix("image/")
        .map(|subtype| ALLOWED_IMAGE_TYPES.contains(&subtype))
        .unwrap_or(false)
}
