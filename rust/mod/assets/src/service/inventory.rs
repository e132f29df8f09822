use assettrack_core::{ServiceError, new_id, today};
use serde_json::Value;

use crate::model::{InventoryItem, NewInventoryItem};
use crate::service::{Persisted, StorageFacade, patched};

impl StorageFacade {
    pub async fn get_inventory(&self) -> Result<Vec<InventoryItem>, ServiceError> {
        self.list().await
    }

    pub async fn create_inventory_item(
        &self,
        input: NewInventoryItem,
    ) -> Result<Persisted<InventoryItem>, ServiceError> {
        let id = input
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(new_id);
        let item = input.into_item(id);
        item.validate()?;
        self.create(item).await
    }

    pub async fn update_inventory_item(
        &self,
        id: &str,
        patch: &Value,
    ) -> Result<Persisted<InventoryItem>, ServiceError> {
        let current: InventoryItem = self.get(id).await?;
        let next = patched(&current, patch)?;
        next.validate()?;
        self.replace(&current, next).await
    }

    pub async fn delete_inventory_item(
        &self,
        id: &str,
    ) -> Result<Persisted<InventoryItem>, ServiceError> {
        self.delete(id).await
    }

    /// Add `delta` units (negative to issue stock). Restocking stamps
    /// `last_restocked`; stock can never go below zero.
    pub async fn adjust_stock(
        &self,
        id: &str,
        delta: i64,
    ) -> Result<Persisted<InventoryItem>, ServiceError> {
        let current: InventoryItem = self.get(id).await?;
        let level = i64::from(current.current_stock)
            .checked_add(delta)
            .and_then(|level| u32::try_from(level).ok())
            .ok_or_else(|| {
                if delta < 0 {
                    ServiceError::Validation(format!(
                        "cannot issue {} {} of '{}': only {} in stock",
                        delta.unsigned_abs(),
                        current.unit,
                        current.name,
                        current.current_stock
                    ))
                } else {
                    ServiceError::Validation(format!(
                        "cannot add {} {} to '{}': stock level out of range",
                        delta, current.unit, current.name
                    ))
                }
            })?;
        let mut next = current.clone();
        next.current_stock = level;
        if delta > 0 {
            next.last_restocked = Some(today());
        }
        self.replace(&current, next).await
    }
}
