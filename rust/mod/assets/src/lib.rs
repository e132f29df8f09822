pub mod model;
pub mod api;
pub mod audit;
pub mod exchange;
pub mod service;
pub mod store;
pub mod workflow;

mod store_impls;

use std::sync::Arc;

use axum::Router;
use assettrack_core::Module;

use api::AppState;
use audit::AuditLogger;
use service::StorageFacade;

/// Asset tracking: register, custody, maintenance, disposal, inventory,
/// users and the audit trail.
pub struct AssetsModule {
    state: AppState,
}

impl AssetsModule {
    pub fn new(store: Arc<StorageFacade>, audit: Arc<AuditLogger>) -> Self {
        Self {
            state: AppState { store, audit },
        }
    }

    pub fn store(&self) -> &Arc<StorageFacade> {
        &self.state.store
    }
}

impl Module for AssetsModule {
    fn name(&self) -> &str {
        "assets"
    }

    fn routes(&self) -> Router {
        api::build_router(self.state.clone())
    }
}
