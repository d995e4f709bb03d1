//! Static file serving: stored uploads and the single-page frontend.

use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Entry document of the frontend, returned for any path no file matches.
pub const INDEX_HTML: &str = "index.html";

/// Serves stored images verbatim from the uploads directory. A missing file falls through to
/// the frontend entry document, like every other unmatched path.
pub fn uploads(uploads_dir: &Path, public_dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(uploads_dir).fallback(ServeFile::new(public_dir.join(INDEX_HTML)))
}

/// Serves the public directory, falling back to its `index.html` with `200 OK` so that
/// client-side routes resolve.
pub fn frontend(public_dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join(INDEX_HTML)))
}
