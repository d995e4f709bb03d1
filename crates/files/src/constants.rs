//! Upload constants shared by the storage service and its callers.

/// Image types accepted for upload, matched against both the file extension and the
/// subtype of the declared content type.
pub const ALLOWED_IMAGE_TYPES: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

/// Default upper bound for a single uploaded image (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// URL path under which stored images are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Default directory for stored images, relative to the working directory.
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";
