//! Startup checks, store wiring and first-run seeding.

use std::sync::Arc;

use assets::service::StorageFacade;
use assets::store::seed_defaults;
use assettrack_core::ServiceConfig;
use assettrack_kv::{KVStore, RedbStore};
use assettrack_remote::{PostgrestClient, RemoteBackend, RemoteConfig};
use tracing::{info, warn};

use crate::config::ServerConfig;

/// Refuse to start on a config that cannot work.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.storage.data_dir.trim().is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    if config.audit.local_capacity == 0 {
        anyhow::bail!("audit.local_capacity must be at least 1.");
    }
    if config.seed.enabled && config.seed.initial_password.is_empty() {
        anyhow::bail!(
            "Seeding is enabled but seed.initial_password is empty.\n\
             Set a password for the default accounts or disable seeding."
        );
    }
    Ok(())
}

pub fn open_kv(core: &ServiceConfig) -> anyhow::Result<Arc<dyn KVStore>> {
    let path = core.resolve_db_path();
    let kv = RedbStore::open(&path)
        .map_err(|e| anyhow::anyhow!("failed to open KV store {}: {}", path.display(), e))?;
    info!("Local store at {}", path.display());
    Ok(Arc::new(kv))
}

/// The hosted backend, if configured. A client that cannot be built is
/// logged and treated as absent.
pub fn connect_remote(config: Option<RemoteConfig>) -> Option<Arc<dyn RemoteBackend>> {
    let config = match config {
        Some(c) => c,
        None => {
            info!("No remote backend configured, running on the local store only");
            return None;
        }
    };
    let url = config.url.clone();
    match PostgrestClient::new(config) {
        Ok(client) => {
            info!("Remote backend at {}", url);
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!(error = %e, "cannot build remote client, running on the local store only");
            None
        }
    }
}

/// Log the datasets already present in the local store.
pub fn report_local(facade: &StorageFacade) -> anyhow::Result<usize> {
    let documents = facade.local().stored_documents()?;
    for (key, bytes) in &documents {
        info!(key = %key, bytes, "local dataset present");
    }
    Ok(documents.len())
}

/// Write the default dataset on first start.
pub fn seed(facade: &StorageFacade, config: &ServerConfig) -> anyhow::Result<()> {
    if !config.seed.enabled {
        return Ok(());
    }
    if seed_defaults(facade.local(), &config.seed.initial_password)? {
        info!("Seeded default users and assets");
    } else {
        info!("Local store already initialized, skipping seed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assettrack_kv::MemoryStore;

    fn config(toml: &str) -> ServerConfig {
        ServerConfig::parse(toml).unwrap()
    }

    #[test]
    fn seeding_requires_a_password() {
        let c = config("[storage]\ndata_dir = \"/tmp\"\n");
        assert!(verify_config(&c).is_err());

        let c = config("[storage]\ndata_dir = \"/tmp\"\n[seed]\nenabled = false\n");
        assert!(verify_config(&c).is_ok());

        let c = config("[storage]\ndata_dir = \"\"\n[seed]\nenabled = false\n");
        assert!(verify_config(&c).is_err());
    }

    #[tokio::test]
    async fn seed_runs_once() {
        let c = config("[storage]\ndata_dir = \"/tmp\"\n[seed]\ninitial_password = \"pw\"\n");
        let facade = StorageFacade::new(Arc::new(MemoryStore::new()), None);
        seed(&facade, &c).unwrap();
        let users = facade.get_users().await.unwrap();
        assert_eq!(users.len(), 3);

        facade
            .delete_user(&users[0].id)
            .await
            .unwrap();
        seed(&facade, &c).unwrap();
        assert_eq!(facade.get_users().await.unwrap().len(), 2);
    }

    #[test]
    fn report_counts_seeded_datasets() {
        let c = config("[storage]\ndata_dir = \"/tmp\"\n[seed]\ninitial_password = \"pw\"\n");
        let facade = StorageFacade::new(Arc::new(MemoryStore::new()), None);
        assert_eq!(report_local(&facade).unwrap(), 0);
        seed(&facade, &c).unwrap();
        assert_eq!(report_local(&facade).unwrap(), 2);
    }

    #[test]
    fn redb_store_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let core = ServiceConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let kv = open_kv(&core).unwrap();
        kv.set("k", b"v").unwrap();
        assert!(dir.path().join("assets.redb").exists());
    }

    #[test]
    fn no_remote_without_config() {
        assert!(connect_remote(None).is_none());
    }
}
