use assettrack_core::{ServiceError, new_id, today};
use tracing::info;

use super::{AssetEffect, Transition, asset_write, fire, related_asset, with_status};
use crate::model::{AssetStatus, MaintenanceRecord, MaintenanceStatus, ScheduleMaintenance};
use crate::service::{Persisted, StorageFacade, WriteOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceEvent {
    Start,
    Complete,
    Cancel,
    MarkOverdue,
}

use MaintenanceStatus as S;

pub const MAINTENANCE_TRANSITIONS: &[Transition<MaintenanceStatus, MaintenanceEvent>] = &[
    Transition {
        event: MaintenanceEvent::Start,
        from: &[S::Scheduled, S::Overdue],
        to: S::InProgress,
        asset: AssetEffect::Keep,
    },
    Transition {
        event: MaintenanceEvent::Complete,
        from: &[S::Scheduled, S::InProgress, S::Overdue],
        to: S::Completed,
        asset: AssetEffect::Set(AssetStatus::InUse),
    },
    Transition {
        event: MaintenanceEvent::Cancel,
        from: &[S::Scheduled, S::InProgress, S::Overdue],
        to: S::Cancelled,
        asset: AssetEffect::Set(AssetStatus::InUse),
    },
    Transition {
        event: MaintenanceEvent::MarkOverdue,
        from: &[S::Scheduled],
        to: S::Overdue,
        asset: AssetEffect::Keep,
    },
];

/// Scheduling and progressing maintenance jobs together with the asset's
/// status.
pub struct MaintenanceWorkflow<'a> {
    store: &'a StorageFacade,
}

impl<'a> MaintenanceWorkflow<'a> {
    pub fn new(store: &'a StorageFacade) -> Self {
        Self { store }
    }

    /// Create a Scheduled record and put the asset In Maintenance.
    pub async fn schedule(
        &self,
        asset_id: &str,
        input: ScheduleMaintenance,
    ) -> Result<Persisted<MaintenanceRecord>, ServiceError> {
        let asset = self.store.get_asset(asset_id).await?;
        if asset.status == AssetStatus::PendingDisposal {
            return Err(ServiceError::Validation(format!(
                "asset '{}' is pending disposal",
                asset.name
            )));
        }
        let record = MaintenanceRecord {
            id: new_id(),
            asset_id: asset.id.clone(),
            asset_name: asset.name.clone(),
            maintenance_type: input.maintenance_type,
            status: MaintenanceStatus::Scheduled,
            scheduled_date: input.scheduled_date,
            completed_date: None,
            assigned_to: input.assigned_to,
            cost: input.estimated_cost.unwrap_or(0.0),
            description: input.description,
            notes: input.notes,
        };
        record.validate()?;

        let mut ops = vec![WriteOp::insert(&record)?];
        if asset.status != AssetStatus::InMaintenance {
            ops.push(WriteOp::update(&asset, &with_status(&asset, AssetStatus::InMaintenance))?);
        }
        let applied = self.store.apply(ops).await?;
        info!(record = %record.id, asset = %asset.id, origin = ?applied.origin, "maintenance scheduled");
        Ok(Persisted {
            origin: applied.origin,
            value: applied.record(0, record),
        })
    }

    pub async fn start(&self, id: &str) -> Result<Persisted<MaintenanceRecord>, ServiceError> {
        self.transition(id, MaintenanceEvent::Start, |_| {}).await
    }

    /// Close the job, recording the final cost if given, and return the
    /// asset to service.
    pub async fn complete(
        &self,
        id: &str,
        cost: Option<f64>,
    ) -> Result<Persisted<MaintenanceRecord>, ServiceError> {
        if let Some(cost) = cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(ServiceError::Validation(
                    "cost must be a non-negative number".into(),
                ));
            }
        }
        self.transition(id, MaintenanceEvent::Complete, |record| {
            record.completed_date = Some(today());
            if let Some(cost) = cost {
                record.cost = cost;
            }
        })
        .await
    }

    pub async fn cancel(&self, id: &str) -> Result<Persisted<MaintenanceRecord>, ServiceError> {
        self.transition(id, MaintenanceEvent::Cancel, |_| {}).await
    }

    /// Flag every Scheduled job dated before today.
    pub async fn mark_overdue(&self) -> Result<Vec<MaintenanceRecord>, ServiceError> {
        self.mark_overdue_as_of(&today()).await
    }

    /// Flag every Scheduled job dated before `day` (`YYYY-MM-DD`).
    pub async fn mark_overdue_as_of(&self, day: &str) -> Result<Vec<MaintenanceRecord>, ServiceError> {
        let mut ops = Vec::new();
        let mut flagged = Vec::new();
        for record in self.store.get_maintenance_records().await? {
            if record.status != MaintenanceStatus::Scheduled || record.scheduled_date.as_str() >= day {
                continue;
            }
            let step = fire(MAINTENANCE_TRANSITIONS, record.status, MaintenanceEvent::MarkOverdue)?;
            let mut next = record.clone();
            next.status = step.to;
            ops.push(WriteOp::update(&record, &next)?);
            flagged.push(next);
        }
        if !ops.is_empty() {
            self.store.apply(ops).await?;
            info!(count = flagged.len(), "maintenance marked overdue");
        }
        Ok(flagged)
    }

    async fn transition(
        &self,
        id: &str,
        event: MaintenanceEvent,
        edit: impl FnOnce(&mut MaintenanceRecord),
    ) -> Result<Persisted<MaintenanceRecord>, ServiceError> {
        let record: MaintenanceRecord = self.store.get(id).await?;
        let step = fire(MAINTENANCE_TRANSITIONS, record.status, event)?;

        let mut next = record.clone();
        next.status = step.to;
        edit(&mut next);

        let mut ops = vec![WriteOp::update(&record, &next)?];
        if step.asset != AssetEffect::Keep {
            if let Some(asset) = related_asset(self.store, &record.asset_id).await? {
                ops.extend(asset_write(&asset, step.asset)?);
            }
        }
        let applied = self.store.apply(ops).await?;
        info!(record = %id, event = ?event, status = %next.status, "maintenance transition");
        Ok(Persisted {
            origin: applied.origin,
            value: applied.record(0, next),
        })
    }
}
