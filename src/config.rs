//! Site configuration: where the REST API lives and the anti-forgery nonce

use crate::error::ApiError;

pub const ENV_API_URL: &str = "PROPERTY_ADMIN_API_URL";
pub const ENV_NONCE: &str = "PROPERTY_ADMIN_NONCE";
pub const ENV_PER_PAGE: &str = "PROPERTY_ADMIN_PER_PAGE";

pub const DEFAULT_PER_PAGE: u32 = 20;

/// Configuration injected by the hosting WordPress page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// REST namespace root, e.g. `https://example.com/wp-json/properties/v1`
    pub api_base: String,
    /// Value sent in the `X-WP-Nonce` header with every request
    pub nonce: String,
    pub per_page: u32,
}

impl SiteConfig {
    /// Build a config from optional parts. Blank values count as missing.
    pub fn from_parts(
        api_base: Option<String>,
        nonce: Option<String>,
        per_page: Option<u32>,
    ) -> Result<Self, ApiError> {
        let api_base = api_base
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ApiError::MissingConfig(ENV_API_URL))?;
        let nonce = nonce
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ApiError::MissingConfig(ENV_NONCE))?;

        Ok(Self {
            api_base,
            nonce,
            per_page: per_page.filter(|n| *n > 0).unwrap_or(DEFAULT_PER_PAGE),
        })
    }

    /// Absolute URL for a path below the API base
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_nonce_is_rejected() {
        let err = SiteConfig::from_parts(Some("https://x.test/wp-json".into()), None, None)
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingConfig(ENV_NONCE)));
    }

    #[test]
    fn test_blank_url_is_missing() {
        let err = SiteConfig::from_parts(Some("   ".into()), Some("abc".into()), None).unwrap_err();
        assert!(matches!(err, ApiError::MissingConfig(ENV_API_URL)));
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let config = SiteConfig::from_parts(
            Some("https://x.test/wp-json/properties/v1/".into()),
            Some("abc".into()),
            Some(0),
        )
        .unwrap();
        assert_eq!(config.per_page, DEFAULT_PER_PAGE);
        assert_eq!(
            config.endpoint("/properties/12"),
            "https://x.test/wp-json/properties/v1/properties/12"
        );
    }
}
