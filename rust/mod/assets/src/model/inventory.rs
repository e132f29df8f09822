use assettrack_core::ServiceError;
use serde::{Deserialize, Serialize};

labeled_enum! {
    /// Stock level band, derived from `current_stock` against `min_stock`.
    InventoryStatus {
        InStock => ("In Stock", "in_stock"),
        LowStock => ("Low Stock", "low_stock"),
        OutOfStock => ("Out of Stock", "out_of_stock"),
    }
}

impl InventoryStatus {
    pub fn derive(current_stock: u32, min_stock: u32) -> Self {
        if current_stock == 0 {
            Self::OutOfStock
        } else if current_stock <= min_stock {
            Self::LowStock
        } else {
            Self::InStock
        }
    }
}

/// A consumable supply tracked by count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Counting unit: pcs, boxes, reams, ...
    pub unit: String,
    pub current_stock: u32,
    pub min_stock: u32,
    pub max_stock: u32,
    #[serde(default)]
    pub unit_cost: f64,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub last_restocked: Option<String>,
    /// Kept in step with the counts on every write.
    #[serde(default = "default_status")]
    pub status: InventoryStatus,
}

fn default_status() -> InventoryStatus {
    InventoryStatus::InStock
}

impl InventoryItem {
    pub fn refresh_status(&mut self) {
        self.status = InventoryStatus::derive(self.current_stock, self.min_stock);
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        for (field, value) in [
            ("name", &self.name),
            ("category", &self.category),
            ("unit", &self.unit),
        ] {
            if value.trim().is_empty() {
                return Err(ServiceError::Validation(format!("{} is required", field)));
            }
        }
        if self.min_stock > self.max_stock {
            return Err(ServiceError::Validation(format!(
                "minimum stock {} exceeds maximum stock {}",
                self.min_stock, self.max_stock
            )));
        }
        if !self.unit_cost.is_finite() || self.unit_cost < 0.0 {
            return Err(ServiceError::Validation(
                "unit cost must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}

/// Input for adding an inventory item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub unit: String,
    #[serde(default)]
    pub current_stock: u32,
    #[serde(default)]
    pub min_stock: u32,
    pub max_stock: u32,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
}

impl NewInventoryItem {
    pub fn into_item(self, id: String) -> InventoryItem {
        let mut item = InventoryItem {
            id,
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            unit: self.unit.trim().to_string(),
            current_stock: self.current_stock,
            min_stock: self.min_stock,
            max_stock: self.max_stock,
            unit_cost: self.unit_cost,
            location: self.location,
            supplier: self.supplier,
            last_restocked: None,
            status: InventoryStatus::InStock,
        };
        item.refresh_status();
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bands() {
        assert_eq!(InventoryStatus::derive(0, 5), InventoryStatus::OutOfStock);
        assert_eq!(InventoryStatus::derive(5, 5), InventoryStatus::LowStock);
        assert_eq!(InventoryStatus::derive(6, 5), InventoryStatus::InStock);
        assert_eq!(InventoryStatus::derive(0, 0), InventoryStatus::OutOfStock);
    }

    #[test]
    fn thresholds_must_be_ordered() {
        let item = NewInventoryItem {
            name: "Bond paper".into(),
            category: "Office Supplies".into(),
            unit: "reams".into(),
            current_stock: 10,
            min_stock: 50,
            max_stock: 20,
            ..Default::default()
        }
        .into_item("I1".into());
        assert_eq!(item.status, InventoryStatus::LowStock);
        assert!(item.validate().unwrap_err().to_string().contains("exceeds"));
    }
}
