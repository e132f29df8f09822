//! `assetd`: the asset-tracking server.
//!
//! Usage:
//!   assetd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/assettrack/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use assets::AssetsModule;
use assets::audit::AuditLogger;
use assets::service::StorageFacade;
use assettrack_core::Module;
use config::ServerConfig;

/// Asset tracking server.
#[derive(Parser, Debug)]
#[command(name = "assetd", about = "LGU asset tracking server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the config file and the 0.0.0.0:8080 default).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    bootstrap::verify_config(&server_config)?;

    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let mut core_config = assettrack_core::ServiceConfig {
        data_dir: Some(data_dir),
        ..Default::default()
    };
    if let Some(listen) = cli.listen.clone().or_else(|| server_config.server.listen.clone()) {
        core_config.listen = listen;
    }

    let kv = bootstrap::open_kv(&core_config)?;
    let remote = bootstrap::connect_remote(server_config.remote_config());
    let store = Arc::new(StorageFacade::new(kv, remote));
    bootstrap::report_local(&store)?;
    bootstrap::seed(&store, &server_config)?;

    let audit = Arc::new(AuditLogger::new(
        store.clone(),
        server_config.audit.local_capacity,
    ));

    let modules: Vec<Box<dyn Module>> = vec![Box::new(AssetsModule::new(store, audit))];
    for module in &modules {
        info!("Module {} initialized", module.name());
    }
    let app = routes::build_router(&modules);

    let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
    info!("assetd listening on {}", core_config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
