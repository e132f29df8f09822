use assettrack_core::{ServiceError, new_id};
use serde::Deserialize;
use serde_json::Value;

use crate::model::{Asset, AssetStatus, NewAsset};
use crate::service::{Persisted, StorageFacade, patched};

/// Filters accepted by the asset list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFilter {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    /// Free text over name, serial number, holder and location.
    #[serde(default)]
    pub q: Option<String>,
}

impl AssetFilter {
    pub fn matches(&self, asset: &Asset) -> bool {
        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            if AssetStatus::parse(status) != Some(asset.status) {
                return false;
            }
        }
        if let Some(department) = self.department.as_deref().filter(|s| !s.is_empty()) {
            if !asset.department.eq_ignore_ascii_case(department.trim()) {
                return false;
            }
        }
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let q = q.to_lowercase();
            let hit = [
                Some(asset.name.as_str()),
                asset.serial_number.as_deref(),
                asset.assigned_to.as_deref(),
                asset.location.as_deref(),
                Some(asset.id.as_str()),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&q));
            if !hit {
                return false;
            }
        }
        true
    }
}

impl NewAsset {
    pub fn into_asset(self) -> Asset {
        Asset {
            id: self.id.filter(|id| !id.trim().is_empty()).unwrap_or_else(new_id),
            name: self.name.trim().to_string(),
            category: self.category,
            status: self.status.unwrap_or(AssetStatus::InStorage),
            department: self.department,
            assigned_to: self.assigned_to.filter(|s| !s.trim().is_empty()),
            purchase_date: self.purchase_date.filter(|s| !s.trim().is_empty()),
            purchase_price: self.purchase_price.unwrap_or(0.0),
            serial_number: self.serial_number.filter(|s| !s.trim().is_empty()),
            location: self.location,
            notes: self.notes,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

/// Two assets clash when they share a name and serial number.
fn same_identity(a: &Asset, b: &Asset) -> bool {
    a.name.eq_ignore_ascii_case(&b.name)
        && a.serial_number.as_deref().map(str::to_lowercase)
            == b.serial_number.as_deref().map(str::to_lowercase)
}

impl StorageFacade {
    pub async fn get_assets(&self) -> Result<Vec<Asset>, ServiceError> {
        self.list().await
    }

    pub async fn get_asset(&self, id: &str) -> Result<Asset, ServiceError> {
        self.get(id).await
    }

    /// Register an asset after validating it against the fixed category and
    /// department lists and the existing register.
    pub async fn create_asset(&self, input: NewAsset) -> Result<Persisted<Asset>, ServiceError> {
        let mut asset = input.into_asset();
        asset.validate()?;
        self.check_asset_unique(&asset).await?;
        self.create(asset).await
    }

    pub async fn update_asset(&self, id: &str, patch: &Value) -> Result<Persisted<Asset>, ServiceError> {
        let current: Asset = self.get(id).await?;
        let mut next = patched(&current, patch)?;
        next.validate()?;
        self.check_asset_unique(&next).await?;
        self.replace(&current, next).await
    }

    pub async fn delete_asset(&self, id: &str) -> Result<Persisted<Asset>, ServiceError> {
        self.delete(id).await
    }

    pub(crate) async fn check_asset_unique(&self, asset: &Asset) -> Result<(), ServiceError> {
        let existing = self.get_assets().await?;
        check_unique(&existing, asset)
    }
}

/// Reject `asset` if another record (by id) has the same name and serial.
pub(crate) fn check_unique(existing: &[Asset], asset: &Asset) -> Result<(), ServiceError> {
    if let Some(other) = existing
        .iter()
        .find(|other| other.id != asset.id && same_identity(other, asset))
    {
        return Err(ServiceError::Conflict(format!(
            "asset '{}' with serial '{}' already exists as {}",
            asset.name,
            asset.serial_number.as_deref().unwrap_or(""),
            other.id
        )));
    }
    Ok(())
}
