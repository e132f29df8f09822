use axum::Router;

/// A service module that contributes HTTP routes.
///
/// The server binary collects every module and nests its routes under
/// `/api`.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// Return the module's routes.
    fn routes(&self) -> Router;
}
