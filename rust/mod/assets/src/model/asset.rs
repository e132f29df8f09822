use assettrack_core::ServiceError;
use serde::{Deserialize, Serialize};

labeled_enum! {
    /// Where an asset is in its lifecycle.
    ///
    /// ```text
    /// In Storage ⇄ In Use ⇄ In Maintenance
    ///      ↘          ↓
    ///       Pending Disposal → (deleted)
    /// ```
    AssetStatus {
        InUse => ("In Use", "active"),
        InStorage => ("In Storage", "storage"),
        InMaintenance => ("In Maintenance", "maintenance"),
        PendingDisposal => ("Pending Disposal", "pending_disposal"),
    }
}

/// Asset categories accepted by forms and CSV import.
pub const ASSET_CATEGORIES: &[&str] = &[
    "IT Equipment",
    "Office Equipment",
    "Furniture",
    "Vehicles",
    "Medical Equipment",
    "Communication Equipment",
    "Machinery",
    "Infrastructure",
];

/// LGU departments an asset, user, or assignment can belong to.
pub const DEPARTMENTS: &[&str] = &[
    "Office of the Mayor",
    "Treasury Office",
    "Engineering Office",
    "Health Office",
    "Social Welfare Office",
    "Planning and Development",
    "Human Resources",
    "Accounting Office",
    "Assessor's Office",
    "General Services",
];

/// Case-insensitive lookup in a fixed list, returning the canonical spelling.
pub fn canonical(list: &[&'static str], value: &str) -> Option<&'static str> {
    let value = value.trim();
    list.iter().copied().find(|c| c.eq_ignore_ascii_case(value))
}

/// A tracked government asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub category: String,
    pub status: AssetStatus,
    pub department: String,
    /// Current holder: an employee, a department, or a location name.
    pub assigned_to: Option<String>,
    /// `YYYY-MM-DD`.
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub purchase_price: f64,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Asset {
    /// Check required fields and enumerations, canonicalizing category and
    /// department spelling in place.
    pub fn validate(&mut self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::Validation("asset name is required".into()));
        }
        self.category = canonical(ASSET_CATEGORIES, &self.category)
            .ok_or_else(|| {
                ServiceError::Validation(format!("invalid category '{}'", self.category))
            })?
            .to_string();
        self.department = canonical(DEPARTMENTS, &self.department)
            .ok_or_else(|| {
                ServiceError::Validation(format!("invalid department '{}'", self.department))
            })?
            .to_string();
        if !self.purchase_price.is_finite() || self.purchase_price < 0.0 {
            return Err(ServiceError::Validation(
                "purchase price must be a non-negative number".into(),
            ));
        }
        if let Some(date) = self.purchase_date.as_deref() {
            validate_date("purchase date", date)?;
        }
        Ok(())
    }
}

/// Reject anything that is not a `YYYY-MM-DD` calendar date.
pub fn validate_date(field: &str, value: &str) -> Result<(), ServiceError> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ServiceError::Validation(format!("{} '{}' is not YYYY-MM-DD", field, value)))
}

/// Input for registering an asset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    /// Caller-chosen id; generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    /// Defaults to In Storage.
    #[serde(default)]
    pub status: Option<AssetStatus>,
    pub department: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset() -> Asset {
        Asset {
            id: "A1".into(),
            name: "Desktop PC".into(),
            category: "it equipment".into(),
            status: AssetStatus::InUse,
            department: "treasury office".into(),
            assigned_to: None,
            purchase_date: Some("2023-04-01".into()),
            purchase_price: 45000.0,
            serial_number: None,
            location: None,
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn status_labels_and_codes() {
        assert_eq!(AssetStatus::InUse.label(), "In Use");
        assert_eq!(AssetStatus::InUse.code(), "active");
        assert_eq!(AssetStatus::from_code("pending_disposal"), Some(AssetStatus::PendingDisposal));
        assert_eq!(AssetStatus::from_label("In Storage"), Some(AssetStatus::InStorage));
        assert_eq!(AssetStatus::parse(" in maintenance "), Some(AssetStatus::InMaintenance));
        assert_eq!(AssetStatus::parse("ACTIVE"), Some(AssetStatus::InUse));
        assert_eq!(AssetStatus::parse("lost"), None);
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_value(AssetStatus::PendingDisposal).unwrap();
        assert_eq!(json, "Pending Disposal");
    }

    #[test]
    fn validate_canonicalizes() {
        let mut a = asset();
        a.validate().unwrap();
        assert_eq!(a.category, "IT Equipment");
        assert_eq!(a.department, "Treasury Office");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut a = asset();
        a.category = "Spaceships".into();
        assert!(a.validate().unwrap_err().to_string().contains("invalid category"));

        let mut a = asset();
        a.name = "  ".into();
        assert!(a.validate().is_err());

        let mut a = asset();
        a.purchase_price = -1.0;
        assert!(a.validate().is_err());

        let mut a = asset();
        a.purchase_date = Some("04/01/2023".into());
        assert!(a.validate().unwrap_err().to_string().contains("YYYY-MM-DD"));
    }
}
