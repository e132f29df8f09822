use assettrack_core::ServiceError;
use serde_json::Value;

use crate::model::MaintenanceRecord;
use crate::model::asset::validate_date;
use crate::service::{Persisted, StorageFacade, patched, required};

impl MaintenanceRecord {
    pub fn validate(&self) -> Result<(), ServiceError> {
        required("asset", &self.asset_id)?;
        required("assignee", &self.assigned_to)?;
        required("description", &self.description)?;
        validate_date("scheduled date", &self.scheduled_date)?;
        if let Some(done) = self.completed_date.as_deref() {
            validate_date("completed date", done)?;
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(ServiceError::Validation(
                "cost must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}

impl StorageFacade {
    pub async fn get_maintenance_records(&self) -> Result<Vec<MaintenanceRecord>, ServiceError> {
        self.list().await
    }

    pub async fn create_maintenance_record(
        &self,
        record: MaintenanceRecord,
    ) -> Result<Persisted<MaintenanceRecord>, ServiceError> {
        record.validate()?;
        self.create(record).await
    }

    pub async fn update_maintenance_record(
        &self,
        id: &str,
        patch: &Value,
    ) -> Result<Persisted<MaintenanceRecord>, ServiceError> {
        let current: MaintenanceRecord = self.get(id).await?;
        let next = patched(&current, patch)?;
        next.validate()?;
        self.replace(&current, next).await
    }

    pub async fn delete_maintenance_record(
        &self,
        id: &str,
    ) -> Result<Persisted<MaintenanceRecord>, ServiceError> {
        self.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MaintenanceStatus, MaintenanceType};
    use assettrack_kv::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn maintenance_crud() {
        let facade = StorageFacade::new(Arc::new(MemoryStore::new()), None);
        let record = MaintenanceRecord {
            id: String::new(),
            asset_id: "A1".into(),
            asset_name: "Printer".into(),
            maintenance_type: MaintenanceType::Inspection,
            status: MaintenanceStatus::Scheduled,
            scheduled_date: "2024-07-01".into(),
            completed_date: None,
            assigned_to: "GSO".into(),
            cost: 0.0,
            description: "Annual check".into(),
            notes: None,
        };
        let id = facade.create_maintenance_record(record).await.unwrap().value.id;

        let err = facade
            .update_maintenance_record(&id, &json!({"cost": -5}))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        facade
            .update_maintenance_record(&id, &json!({"notes": "Bring ladder"}))
            .await
            .unwrap();
        assert_eq!(
            facade.get_maintenance_records().await.unwrap()[0].notes.as_deref(),
            Some("Bring ladder")
        );

        facade.delete_maintenance_record(&id).await.unwrap();
        assert!(facade.get_maintenance_records().await.unwrap().is_empty());
    }
}
