//! Server configuration file.
//!
//! ```toml
//! [server]
//! listen = "0.0.0.0:8080"
//!
//! [storage]
//! data_dir = "/var/lib/assettrack"
//!
//! [remote]            # optional; SUPABASE_URL / SUPABASE_ANON_KEY win
//! url = "https://xyz.supabase.co"
//! key = "..."
//!
//! [audit]
//! local_capacity = 1000
//!
//! [seed]
//! enabled = true
//! initial_password = "..."
//! ```

use std::path::{Path, PathBuf};

use assettrack_remote::RemoteConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    pub storage: StorageConfig,
    #[serde(default)]
    pub remote: Option<RemoteSection>,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSection {
    #[serde(default)]
    pub listen: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSection {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_capacity")]
    pub local_capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            local_capacity: default_capacity(),
        }
    }
}

fn default_capacity() -> usize {
    assets::audit::DEFAULT_CAPACITY
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Password given to every seeded account.
    #[serde(default)]
    pub initial_password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_password: String::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl ServerConfig {
    /// A context name resolves to `/etc/assettrack/<name>.toml`; anything
    /// containing `/` or `.` is used as a path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from("/etc/assettrack").join(format!("{}.toml", name_or_path))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Backend settings: the environment first, then the `[remote]` table.
    pub fn remote_config(&self) -> Option<RemoteConfig> {
        RemoteConfig::from_env().or_else(|| self.file_remote())
    }

    fn file_remote(&self) -> Option<RemoteConfig> {
        let section = self.remote.as_ref()?;
        let mut config = RemoteConfig::from_values(section.url.as_deref(), section.key.as_deref())?;
        if let Some(secs) = section.timeout_secs {
            config.timeout_secs = secs;
        }
        Some(config)
    }
}
