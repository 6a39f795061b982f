//! Endpoint configuration.
//!
//! The fetch collaborator talks to one API root and serves static files from
//! one base URL. Both can be overridden from the environment.

use std::env;

use anyhow::{Result, anyhow};
use log::warn;
use url::Url;

/// Default API root.
pub const DEFAULT_API_URL: &str = "https://127.0.0.1:1443/api";
/// Default origin for static files.
pub const DEFAULT_BASE_URL: &str = "https://127.0.0.1:1443";

/// Where requests are sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchConfig {
    /// Root of the JSON API
    pub api_url: Url,
    /// Origin serving uploaded files
    pub base_url: Url,
}

impl FetchConfig {
    /// Construct a new `FetchConfig` with explicit URLs.
    ///
    /// # Returns
    ///
    /// A new `FetchConfig` using the given roots
    #[inline]
    #[must_use]
    pub const fn new(api_url: Url, base_url: Url) -> Self {
        Self { api_url, base_url }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `TESSERA_API_URL`: API root (default: `https://127.0.0.1:1443/api`)
    /// - `TESSERA_BASE_URL`: static file origin (default: `https://127.0.0.1:1443`)
    ///
    /// Unparsable values are logged and replaced by the default.
    ///
    /// # Returns
    ///
    /// A new `FetchConfig` populated from environment variables
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_url: url_from_env("TESSERA_API_URL", DEFAULT_API_URL),
            base_url: url_from_env("TESSERA_BASE_URL", DEFAULT_BASE_URL),
        }
    }

    /// URL of an API endpoint below the API root. Segments are percent-encoded.
    ///
    /// # Errors
    /// Fails if the API root cannot carry a path.
    pub fn api_endpoint(&self, segments: &[&str]) -> Result<Url> {
        join_segments(&self.api_url, segments)
    }

    /// URL of a static file below the base URL. Segments are percent-encoded.
    ///
    /// # Errors
    /// Fails if the base URL cannot carry a path.
    pub fn static_file(&self, segments: &[&str]) -> Result<Url> {
        join_segments(&self.base_url, segments)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_url: default_url(DEFAULT_API_URL),
            base_url: default_url(DEFAULT_BASE_URL),
        }
    }
}

#[allow(clippy::expect_used, reason = "the default URLs are constants")]
fn default_url(raw: &str) -> Url {
    Url::parse(raw).expect("default URL must parse")
}

fn url_from_env(variable: &str, default: &str) -> Url {
    env::var(variable)
        .ok()
        .and_then(|raw| match Url::parse(&raw) {
            Ok(url) => Some(url),
            Err(error) => {
                warn!("ignoring {variable}={raw:?}: {error}");
                None
            }
        })
        .unwrap_or_else(|| default_url(default))
}

fn join_segments(root: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = root.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| anyhow!("{root} cannot be used as a base URL"))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests the default roots and endpoint joining
    #[test]
    fn test_default_endpoints() -> Result<()> {
        let config = FetchConfig::default();
        assert_eq!(config.api_url.as_str(), "https://127.0.0.1:1443/api");
        assert_eq!(
            config.api_endpoint(&["item", "42", "image"])?.as_str(),
            "https://127.0.0.1:1443/api/item/42/image"
        );
        assert_eq!(
            config.static_file(&["volatile", "images", "1_2_cat photo.png"])?.as_str(),
            "https://127.0.0.1:1443/volatile/images/1_2_cat%20photo.png"
        );
        Ok(())
    }

    /// Tests that a trailing slash on the root does not double up
    #[test]
    fn test_trailing_slash() -> Result<()> {
        let config = FetchConfig::new(Url::parse("http://shop.test/api/")?, Url::parse("http://shop.test/")?);
        assert_eq!(config.api_endpoint(&["item"])?.as_str(), "http://shop.test/api/item");
        assert_eq!(config.static_file(&["a"])?.as_str(), "http://shop.test/a");
        Ok(())
    }
}
