//! Handing assets to holders and moving them between holders.

use assettrack_core::{ServiceError, new_id, now_rfc3339, today};
use tracing::info;

use super::with_status;
use crate::model::{
    Asset, AssetStatus, Assignment, AssignmentStatus, NewAssignment, NewTransfer, Transfer,
};
use crate::service::{Persisted, StorageFacade, WriteOp};

pub struct CustodyWorkflow<'a> {
    store: &'a StorageFacade,
}

impl<'a> CustodyWorkflow<'a> {
    pub fn new(store: &'a StorageFacade) -> Self {
        Self { store }
    }

    /// Assign an unassigned asset. The asset becomes In Use by the holder.
    pub async fn assign(
        &self,
        asset_id: &str,
        input: NewAssignment,
    ) -> Result<Persisted<Assignment>, ServiceError> {
        let asset = self.store.get_asset(asset_id).await?;
        ensure_movable(&asset)?;
        let active = self.active_assignments(&asset.id).await?;
        if let Some(current) = active.first() {
            return Err(ServiceError::Conflict(format!(
                "asset '{}' is already assigned to {}",
                asset.name, current.assigned_to
            )));
        }

        let mut assignment = Assignment {
            id: new_id(),
            asset_id: asset.id.clone(),
            asset_name: asset.name.clone(),
            assigned_to: input.assigned_to.trim().to_string(),
            assignee_type: input.assignee_type,
            department: input.department.unwrap_or_else(|| asset.department.clone()),
            assigned_date: today(),
            due_date: input.due_date,
            status: AssignmentStatus::Active,
            notes: input.notes,
        };
        assignment.validate()?;

        let mut next = with_status(&asset, AssetStatus::InUse);
        next.assigned_to = Some(assignment.assigned_to.clone());
        next.department = assignment.department.clone();

        let ops = vec![WriteOp::insert(&assignment)?, WriteOp::update(&asset, &next)?];
        let applied = self.store.apply(ops).await?;
        info!(asset = %asset.id, holder = %assignment.assigned_to, "asset assigned");
        Ok(Persisted {
            origin: applied.origin,
            value: applied.record(0, assignment),
        })
    }

    /// Move an asset to a new holder: record the transfer, close the open
    /// assignment, open one for the new holder and update the asset.
    pub async fn transfer(
        &self,
        asset_id: &str,
        input: NewTransfer,
    ) -> Result<Persisted<Transfer>, ServiceError> {
        let asset = self.store.get_asset(asset_id).await?;
        if asset.status == AssetStatus::PendingDisposal {
            return Err(ServiceError::Validation(format!(
                "asset '{}' is pending disposal",
                asset.name
            )));
        }

        let mut transfer = Transfer {
            id: new_id(),
            asset_id: asset.id.clone(),
            asset_name: asset.name.clone(),
            from_holder: asset.assigned_to.clone(),
            to_holder: input.to_holder.trim().to_string(),
            from_department: asset.department.clone(),
            to_department: input.to_department,
            reason: input.reason,
            approved_by: input.approved_by.trim().to_string(),
            transfer_date: now_rfc3339(),
        };
        transfer.validate()?;

        let mut ops = vec![WriteOp::insert(&transfer)?];
        for open in self.active_assignments(&asset.id).await? {
            let mut closed = open.clone();
            closed.status = AssignmentStatus::Returned;
            ops.push(WriteOp::update(&open, &closed)?);
        }

        let mut assignment = Assignment {
            id: new_id(),
            asset_id: asset.id.clone(),
            asset_name: asset.name.clone(),
            assigned_to: transfer.to_holder.clone(),
            assignee_type: input.holder_type,
            department: transfer.to_department.clone(),
            assigned_date: today(),
            due_date: None,
            status: AssignmentStatus::Active,
            notes: transfer.reason.clone(),
        };
        assignment.validate()?;
        ops.push(WriteOp::insert(&assignment)?);

        // An asset under maintenance keeps that status until the job closes.
        let status = match asset.status {
            AssetStatus::InMaintenance => AssetStatus::InMaintenance,
            _ => AssetStatus::InUse,
        };
        let mut next = with_status(&asset, status);
        next.assigned_to = Some(transfer.to_holder.clone());
        next.department = transfer.to_department.clone();
        if input.location.is_some() {
            next.location = input.location;
        }
        ops.push(WriteOp::update(&asset, &next)?);

        let applied = self.store.apply(ops).await?;
        info!(
            asset = %asset.id,
            from = %transfer.from_department,
            to = %transfer.to_department,
            "asset transferred"
        );
        Ok(Persisted {
            origin: applied.origin,
            value: applied.record(0, transfer),
        })
    }

    async fn active_assignments(&self, asset_id: &str) -> Result<Vec<Assignment>, ServiceError> {
        Ok(self
            .store
            .get_assignments()
            .await?
            .into_iter()
            .filter(|a| a.asset_id == asset_id && a.status == AssignmentStatus::Active)
            .collect())
    }
}

fn ensure_movable(asset: &Asset) -> Result<(), ServiceError> {
    match asset.status {
        AssetStatus::PendingDisposal | AssetStatus::InMaintenance => Err(ServiceError::Validation(
            format!("asset '{}' is {} and cannot be assigned", asset.name, asset.status),
        )),
        _ => Ok(()),
    }
}
