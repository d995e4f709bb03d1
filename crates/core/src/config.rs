//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into [`crate::CardService`];
//! request handling never reads environment variables.

use crate::{CardError, CardResult};
use cards_files::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_UPLOADS_DIR};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    uploads_dir: PathBuf,
    max_upload_bytes: u64,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `CardError::InvalidConfig` if `max_upload_bytes` is zero.
    pub fn new(uploads_dir: PathBuf, max_upload_bytes: u64) -> CardResult<Self> {
        if max_upload_bytes == 0 {
            return Err(CardError::InvalidConfig(
                "max_upload_bytes must be greater than zero".into(),
            ));
        }

        Ok(Self {
            uploads_dir,
            max_upload_bytes,
        })
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }
}

/// Resolve the uploads directory from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_UPLOADS_DIR`].
pub fn uploads_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOADS_DIR))
}

/// Parse the upload size limit from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_MAX_UPLOAD_BYTES`].
pub fn max_upload_bytes_from_env_value(value: Option<String>) -> CardResult<u64> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value
        .map(|v| {
            v.parse::<u64>().map_err(|e| {
                CardError::InvalidConfig(format!("invalid upload size limit {:?}: {}", v, e))
            })
        })
        .transpose()?;

    Ok(parsed.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_config_rejects_zero_limit() {
        let result = CoreConfig::new(PathBuf::from("uploads"), 0);

        assert!(matches!(result, Err(CardError::InvalidConfig(_))));
    }

    #[test]
    fn test_core_config_getters() {
        let cfg = CoreConfig::new(PathBuf::from("/srv/uploads"), 42).unwrap();

        assert_eq!(cfg.uploads_dir(), Path::new("/srv/uploads"));
        assert_eq!(cfg.max_upload_bytes(), 42);
    }

    #[test]
    fn test_uploads_dir_defaults_when_unset_or_blank() {
        assert_eq!(
            uploads_dir_from_env_value(None),
            PathBuf::from(DEFAULT_UPLOADS_DIR)
        );
        assert_eq!(
            uploads_dir_from_env_value(Some("  ".into())),
            PathBuf::from(DEFAULT_UPLOADS_DIR)
        );
        assert_eq!(
            uploads_dir_from_env_value(Some("/data/img".into())),
            PathBuf::from("/data/img")
        );
    }

    #[test]
    fn test_max_upload_bytes_parsing() {
        assert_eq!(
            max_upload_bytes_from_env_value(None).unwrap(),
            DEFAULT_MAX_UPLOAD_BYTES
        );
        assert_eq!(
            max_upload_bytes_from_env_value(Some(" 2048 ".into())).unwrap(),
            2048
        );
        assert!(matches!(
            max_upload_bytes_from_env_value(Some("ten megs".into())),
            Err(CardError::InvalidConfig(_))
        ));
    }
}
