use std::time::Duration;

use serde::Deserialize;

/// Environment variable carrying the backend base URL.
pub const ENV_URL: &str = "SUPABASE_URL";
/// Environment variable carrying the backend access key.
pub const ENV_KEY: &str = "SUPABASE_ANON_KEY";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL, e.g. `https://xyz.supabase.co`. Trailing slashes are ignored.
    pub url: String,

    /// Access key, sent both as `apikey` and as a bearer token.
    pub key: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl RemoteConfig {
    /// Build a config from a URL/key pair. Returns `None` when either is
    /// missing or blank: the backend is then considered unconfigured.
    pub fn from_values(url: Option<&str>, key: Option<&str>) -> Option<Self> {
        let url = url.map(str::trim).filter(|s| !s.is_empty())?;
        let key = key.map(str::trim).filter(|s| !s.is_empty())?;
        Some(Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            timeout_secs: default_timeout_secs(),
        })
    }

    /// Read [`ENV_URL`] and [`ENV_KEY`].
    pub fn from_env() -> Option<Self> {
        let url = std::env::var(ENV_URL).ok();
        let key = std::env::var(ENV_KEY).ok();
        Self::from_values(url.as_deref(), key.as_deref())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_values_required() {
        assert!(RemoteConfig::from_values(None, Some("k")).is_none());
        assert!(RemoteConfig::from_values(Some("https://x.co"), None).is_none());
        assert!(RemoteConfig::from_values(Some("  "), Some("k")).is_none());
        assert!(RemoteConfig::from_values(Some("https://x.co"), Some("")).is_none());
    }

    #[test]
    fn trailing_slash_trimmed() {
        let config = RemoteConfig::from_values(Some("https://x.co/"), Some("secret")).unwrap();
        assert_eq!(config.url, "https://x.co");
        assert_eq!(config.key, "secret");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }
}
