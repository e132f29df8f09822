use std::collections::HashSet;

use assettrack_core::ServiceError;

use super::{CsvRow, ImportReport, import_rows, write_csv};
use crate::model::asset::validate_date;
use crate::model::{InventoryItem, InventoryStatus};

pub const INVENTORY_HEADERS: &[&str] = &[
    "ID",
    "Name",
    "Category",
    "Unit",
    "Current Stock",
    "Min Stock",
    "Max Stock",
    "Unit Cost",
    "Location",
    "Supplier",
    "Status",
    "Last Restocked",
];

const REQUIRED: &[&str] = &[
    "Name",
    "Category",
    "Unit",
    "Current Stock",
    "Min Stock",
    "Max Stock",
];

pub fn export_inventory(items: &[InventoryItem]) -> Result<String, ServiceError> {
    write_csv(
        INVENTORY_HEADERS,
        items.iter().map(|i| {
            vec![
                i.id.clone(),
                i.name.clone(),
                i.category.clone(),
                i.unit.clone(),
                i.current_stock.to_string(),
                i.min_stock.to_string(),
                i.max_stock.to_string(),
                i.unit_cost.to_string(),
                i.location.clone().unwrap_or_default(),
                i.supplier.clone().unwrap_or_default(),
                i.status.label().to_string(),
                i.last_restocked.clone().unwrap_or_default(),
            ]
        }),
    )
}

/// Validate an inventory CSV. Blank IDs become `I{count+1}`. The status
/// column is ignored; it is derived from the counts.
pub fn parse_inventory_rows(
    text: &str,
    existing: &[InventoryItem],
) -> Result<ImportReport<InventoryItem>, ServiceError> {
    let ids: HashSet<String> = existing.iter().map(|i| i.id.clone()).collect();
    import_rows(
        text,
        REQUIRED,
        ids,
        |count| format!("I{}", count + 1),
        |i: &InventoryItem| i.id.as_str(),
        |row, id, _| {
            let item = item_from_row(row, id)?;
            item.validate().map_err(|e| e.to_string())?;
            Ok(item)
        },
    )
}

fn item_from_row(row: &CsvRow<'_>, id: String) -> Result<InventoryItem, String> {
    let last_restocked = row.get("Last Restocked").map(str::to_string);
    if let Some(date) = last_restocked.as_deref() {
        validate_date("Last Restocked", date).map_err(|e| e.to_string())?;
    }
    let mut item = InventoryItem {
        id,
        name: row.required("Name")?.to_string(),
        category: row.required("Category")?.to_string(),
        unit: row.required("Unit")?.to_string(),
        current_stock: row.count("Current Stock")?,
        min_stock: row.count("Min Stock")?,
        max_stock: row.count("Max Stock")?,
        unit_cost: row.number("Unit Cost")?.unwrap_or(0.0),
        location: row.get("Location").map(str::to_string),
        supplier: row.get("Supplier").map(str::to_string),
        last_restocked,
        status: InventoryStatus::InStock,
    };
    item.refresh_status();
    Ok(item)
}
