use std::collections::HashSet;

use assettrack_core::ServiceError;

use super::{CsvRow, ImportReport, import_rows, write_csv};
use crate::model::{Asset, AssetStatus};
use crate::service::assets::check_unique;

pub const ASSET_HEADERS: &[&str] = &[
    "ID",
    "Name",
    "Category",
    "Status",
    "Department",
    "Assigned To",
    "Purchase Date",
    "Purchase Price",
    "Serial Number",
    "Location",
    "Notes",
];

const REQUIRED: &[&str] = &["Name", "Category", "Status", "Department"];

pub fn export_assets(assets: &[Asset]) -> Result<String, ServiceError> {
    write_csv(
        ASSET_HEADERS,
        assets.iter().map(|a| {
            vec![
                a.id.clone(),
                a.name.clone(),
                a.category.clone(),
                a.status.label().to_string(),
                a.department.clone(),
                a.assigned_to.clone().unwrap_or_default(),
                a.purchase_date.clone().unwrap_or_default(),
                a.purchase_price.to_string(),
                a.serial_number.clone().unwrap_or_default(),
                a.location.clone().unwrap_or_default(),
                a.notes.clone().unwrap_or_default(),
            ]
        }),
    )
}

/// Validate an asset CSV against the register. Blank IDs become
/// `A{count+1}`.
pub fn parse_asset_rows(text: &str, existing: &[Asset]) -> Result<ImportReport<Asset>, ServiceError> {
    let ids: HashSet<String> = existing.iter().map(|a| a.id.clone()).collect();
    import_rows(
        text,
        REQUIRED,
        ids,
        |count| format!("A{}", count + 1),
        |a: &Asset| a.id.as_str(),
        |row, id, accepted| {
            let mut asset = asset_from_row(row, id)?;
            asset.validate().map_err(|e| e.to_string())?;
            check_unique(existing, &asset)
                .and_then(|_| check_unique(accepted, &asset))
                .map_err(|e| e.to_string())?;
            Ok(asset)
        },
    )
}

fn asset_from_row(row: &CsvRow<'_>, id: String) -> Result<Asset, String> {
    let status = row.required("Status")?;
    let status = AssetStatus::parse(status).ok_or_else(|| {
        format!(
            "invalid status '{}' (expected one of: {})",
            status,
            AssetStatus::labels()
        )
    })?;
    Ok(Asset {
        id,
        name: row.required("Name")?.to_string(),
        category: row.required("Category")?.to_string(),
        status,
        department: row.required("Department")?.to_string(),
        assigned_to: row.get("Assigned To").map(str::to_string),
        purchase_date: row.get("Purchase Date").map(str::to_string),
        purchase_price: row.number("Purchase Price")?.unwrap_or(0.0),
        serial_number: row.get("Serial Number").map(str::to_string),
        location: row.get("Location").map(str::to_string),
        notes: row.get("Notes").map(str::to_string),
        created_at: String::new(),
        updated_at: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewAsset;

    fn asset(id: &str, name: &str, status: AssetStatus) -> Asset {
        let mut a = NewAsset {
            id: Some(id.into()),
            name: name.into(),
            category: "Furniture".into(),
            status: Some(status),
            department: "General Services".into(),
            serial_number: Some(format!("SN-{}", id)),
            purchase_price: Some(1250.5),
            notes: Some("Has a \"wobbly\" leg, needs fix".into()),
            ..Default::default()
        }
        .into_asset();
        a.validate().unwrap();
        a
    }

    #[test]
    fn export_then_import_roundtrip() {
        let assets = vec![
            asset("A1", "Conference table", AssetStatus::InUse),
            asset("A2", "Filing cabinet", AssetStatus::InStorage),
            asset("A3", "Steel shelf", AssetStatus::PendingDisposal),
        ];
        let csv = export_assets(&assets).unwrap();
        assert!(csv.starts_with("ID,Name,Category,Status,Department"));

        let report = parse_asset_rows(&csv, &[]).unwrap();
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert_eq!(report.rows.len(), 3);
        for (imported, original) in report.rows.iter().zip(&assets) {
            assert_eq!(imported.id, original.id);
            assert_eq!(imported.name, original.name);
            assert_eq!(imported.status, original.status);
            assert_eq!(imported.purchase_price, original.purchase_price);
            assert_eq!(imported.notes, original.notes);
        }
    }

    #[test]
    fn bad_rows_reported_good_rows_kept() {
        let csv = "\
Name,Category,Status,Department,Serial Number
Projector,IT Equipment,In Use,Health Office,P-1
Hovercraft,Spaceships,In Use,Health Office,H-1
Scanner,IT Equipment,Lost,Health Office,S-1
Router,IT Equipment,active,Treasury Office,R-1
,IT Equipment,In Use,Treasury Office,X-1
Desk,Furniture,In Storage,Ministry of Silly Walks,D-1
";
        let existing = vec![asset("A1", "Conference table", AssetStatus::InUse)];
        let report = parse_asset_rows(csv, &existing).unwrap();

        let names: Vec<&str> = report.rows.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Projector", "Router"]);
        assert_eq!(report.rows[0].id, "A2");
        assert_eq!(report.rows[1].id, "A3");
        assert_eq!(report.rows[1].status, AssetStatus::InUse);

        assert_eq!(report.errors.len(), 4);
        assert!(report.errors[0].starts_with("Row 3: invalid category"));
        assert!(report.errors[1].starts_with("Row 4: invalid status 'Lost'"));
        assert_eq!(report.errors[2], "Row 6: Name is required");
        assert!(report.errors[3].starts_with("Row 7: invalid department"));
    }

    #[test]
    fn duplicate_name_and_serial_rejected() {
        let existing = vec![asset("A1", "Conference table", AssetStatus::InUse)];
        let csv = "Name,Category,Status,Department,Serial Number\n\
                   conference table,Furniture,In Use,General Services,SN-A1\n";
        let report = parse_asset_rows(csv, &existing).unwrap();
        assert!(report.rows.is_empty());
        assert!(report.errors[0].contains("already exists"));
    }
}
