//! REST server configuration.

use anyhow::Context;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Allowance for multipart framing and text fields on top of the image size limit.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

#[derive(Clone, Debug)]
pub struct RestConfig {
    addr: SocketAddr,
    public_dir: PathBuf,
}

impl RestConfig {
    pub fn new(addr: SocketAddr, public_dir: PathBuf) -> Self {
        Self { addr, public_dir }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the listen address.
///
/// A full `addr` wins; otherwise the server binds `0.0.0.0:<port>`, with `port` defaulting to
/// [`DEFAULT_PORT`].
pub fn rest_addr_from_env_values(
    addr: Option<String>,
    port: Option<String>,
) -> anyhow::Result<SocketAddr> {
    if let Some(addr) = non_blank(addr) {
        return addr
            .parse()
            .with_context(|| format!("invalid listen address {:?}", addr));
    }

    let port = non_blank(port)
        .map(|p| {
            p.parse::<u16>()
                .with_context(|| format!("invalid port {:?}", p))
        })
        .transpose()?
        .unwrap_or(DEFAULT_PORT);

    Ok(SocketAddr::from(([0, 0, 0, 0], port)))
}

/// Resolve the public directory, defaulting to [`DEFAULT_PUBLIC_DIR`].
pub fn public_dir_from_env_value(value: Option<String>) -> PathBuf {
    non_blank(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR))
}

/// Request body limit for an upload limit of `max_upload_bytes`.
pub fn body_limit_for(max_upload_bytes: u64) -> usize {
    let limit = max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
    usize::try_from(limit).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_addr_defaults_to_port_3000_on_all_interfaces() {
        let addr = rest_addr_from_env_values(None, None).unwrap();

        assert_eq!(addr, "0.0.0.0:3000".parse().unwrap());
    }

    #[test]
    fn test_rest_addr_uses_port() {
        let addr = rest_addr_from_env_values(None, Some("8080".into())).unwrap();

        assert_eq!(addr.port(), 8080);
        assert!(addr.ip().is_unspecified());
    }

    #[test]
    fn test_rest_addr_override_wins() {
        let addr =
            rest_addr_from_env_values(Some("127.0.0.1:9000".into()), Some("8080".into())).unwrap();

        assert_eq!(addr, "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn test_rest_addr_rejects_garbage() {
        assert!(rest_addr_from_env_values(None, Some("eighty".into())).is_err());
        assert!(rest_addr_from_env_values(Some("localhost".into()), None).is_err());
    }

    #[test]
    fn test_public_dir_default() {
        assert_eq!(public_dir_from_env_value(None), PathBuf::from("public"));
        assert_eq!(
            public_dir_from_env_value(Some("dist".into())),
            PathBuf::from("dist")
        );
    }

    #[test]
    fn test_body_limit_adds_overhead() {
        assert_eq!(body_limit_for(1024), 1024 + 64 * 1024);
    }
}
