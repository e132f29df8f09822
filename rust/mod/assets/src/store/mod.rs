//! Local persistence adapter and the storage contract for records.

pub mod entity;
pub mod local;
pub mod seed;

pub use entity::Entity;
pub use local::{Document, LocalDocument, LocalStore, Transaction};
pub use seed::seed_defaults;
