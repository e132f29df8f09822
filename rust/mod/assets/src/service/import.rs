//! Committing CSV imports. Rows are written one by one: a row that fails
//! to store is reported and the rest still land.

use assettrack_core::ServiceError;
use tracing::info;

use crate::exchange::{parse_asset_rows, parse_inventory_rows};
use crate::model::{Asset, InventoryItem};
use crate::service::StorageFacade;
use crate::store::Entity;

pub use crate::exchange::ImportReport;

impl StorageFacade {
    pub async fn import_assets(&self, text: &str) -> Result<ImportReport<Asset>, ServiceError> {
        let existing = self.get_assets().await?;
        let parsed = parse_asset_rows(text, &existing)?;
        Ok(self.commit(parsed).await)
    }

    pub async fn import_inventory(
        &self,
        text: &str,
    ) -> Result<ImportReport<InventoryItem>, ServiceError> {
        let existing = self.get_inventory().await?;
        let parsed = parse_inventory_rows(text, &existing)?;
        Ok(self.commit(parsed).await)
    }

    async fn commit<T: Entity>(&self, parsed: ImportReport<T>) -> ImportReport<T> {
        let mut report = ImportReport {
            rows: Vec::with_capacity(parsed.rows.len()),
            errors: parsed.errors,
        };
        for row in parsed.rows {
            let id = row.id().to_string();
            match self.create(row).await {
                Ok(stored) => report.rows.push(stored.value),
                Err(e) => report.errors.push(format!("{} '{}': {}", T::LABEL, id, e)),
            }
        }
        info!(
            table = T::TABLE,
            imported = report.rows.len(),
            rejected = report.errors.len(),
            "import committed"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::export_assets;
    use crate::model::AssetStatus;
    use assettrack_kv::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn partial_import_commits_valid_rows() {
        let facade = StorageFacade::new(Arc::new(MemoryStore::new()), None);
        let csv = "\
Name,Category,Status,Department
Ambulance,Vehicles,In Use,Health Office
Spaceship,Vehicles,Orbiting,Health Office
Wheelchair,Medical Equipment,In Storage,Health Office
";
        let report = facade.import_assets(csv).await.unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Row 3: invalid status"));

        let stored = facade.get_assets().await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|a| !a.created_at.is_empty()));
        assert_eq!(stored[1].status, AssetStatus::InStorage);

        // Re-importing the export of the register is all duplicates.
        let export = export_assets(&stored).unwrap();
        let again = facade.import_assets(&export).await.unwrap();
        assert!(again.rows.is_empty());
        assert_eq!(again.errors.len(), 2);
        assert!(again.errors[0].contains("duplicate ID 'A1'"));
    }

    #[tokio::test]
    async fn export_import_reconstructs_inventory() {
        let source = StorageFacade::new(Arc::new(MemoryStore::new()), None);
        let csv = "\
ID,Name,Category,Unit,Current Stock,Min Stock,Max Stock,Unit Cost
I1,Alcohol 70%,Medical Supplies,bottles,40,10,100,85.5
I2,Face masks,Medical Supplies,boxes,3,5,60,120
I3,Printer ink,Office Supplies,bottles,0,2,12,450
";
        source.import_inventory(csv).await.unwrap();
        let exported = crate::exchange::export_inventory(&source.get_inventory().await.unwrap()).unwrap();

        let target = StorageFacade::new(Arc::new(MemoryStore::new()), None);
        let report = target.import_inventory(&exported).await.unwrap();
        assert!(report.errors.is_empty());
        assert_eq!(target.get_inventory().await.unwrap(), source.get_inventory().await.unwrap());
    }
}
