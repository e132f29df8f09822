use assettrack_core::{ServiceError, new_id, today};
use tracing::info;

use super::{AssetEffect, Transition, asset_write, fire, related_asset, with_status};
use crate::model::{AssetStatus, DisposalRequest, DisposalStatus, NewDisposalRequest};
use crate::service::{Persisted, StorageFacade, WriteOp, required};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposalEvent {
    Approve,
    Reject,
    Complete,
}

pub const DISPOSAL_TRANSITIONS: &[Transition<DisposalStatus, DisposalEvent>] = &[
    Transition {
        event: DisposalEvent::Approve,
        from: &[DisposalStatus::PendingApproval],
        to: DisposalStatus::Approved,
        asset: AssetEffect::Keep,
    },
    Transition {
        event: DisposalEvent::Reject,
        from: &[DisposalStatus::PendingApproval],
        to: DisposalStatus::Rejected,
        asset: AssetEffect::Set(AssetStatus::InStorage),
    },
    Transition {
        event: DisposalEvent::Complete,
        from: &[DisposalStatus::Approved],
        to: DisposalStatus::Completed,
        asset: AssetEffect::Remove,
    },
];

pub struct DisposalWorkflow<'a> {
    store: &'a StorageFacade,
}

impl<'a> DisposalWorkflow<'a> {
    pub fn new(store: &'a StorageFacade) -> Self {
        Self { store }
    }

    /// Open a request and mark the asset Pending Disposal.
    pub async fn request(
        &self,
        asset_id: &str,
        input: NewDisposalRequest,
    ) -> Result<Persisted<DisposalRequest>, ServiceError> {
        let asset = self.store.get_asset(asset_id).await?;
        if asset.status == AssetStatus::PendingDisposal {
            return Err(ServiceError::Conflict(format!(
                "asset '{}' is already pending disposal",
                asset.name
            )));
        }
        let request = DisposalRequest {
            id: new_id(),
            asset_id: asset.id.clone(),
            asset_name: asset.name.clone(),
            reason: input.reason.trim().to_string(),
            status: DisposalStatus::PendingApproval,
            requested_by: input.requested_by.trim().to_string(),
            request_date: today(),
            approved_by: None,
            approval_date: None,
            disposal_method: None,
            estimated_value: input.estimated_value.unwrap_or(0.0),
            notes: input.notes,
        };
        request.validate()?;

        let ops = vec![
            WriteOp::insert(&request)?,
            WriteOp::update(&asset, &with_status(&asset, AssetStatus::PendingDisposal))?,
        ];
        let applied = self.store.apply(ops).await?;
        info!(request = %request.id, asset = %asset.id, "disposal requested");
        Ok(Persisted {
            origin: applied.origin,
            value: applied.record(0, request),
        })
    }

    pub async fn approve(
        &self,
        id: &str,
        approver: &str,
    ) -> Result<Persisted<DisposalRequest>, ServiceError> {
        required("approver", approver)?;
        self.transition(id, DisposalEvent::Approve, |r| {
            r.approved_by = Some(approver.trim().to_string());
            r.approval_date = Some(today());
        })
        .await
    }

    /// Turn the request down; the asset goes back to storage.
    pub async fn reject(
        &self,
        id: &str,
        approver: &str,
        note: Option<String>,
    ) -> Result<Persisted<DisposalRequest>, ServiceError> {
        required("approver", approver)?;
        self.transition(id, DisposalEvent::Reject, |r| {
            r.approved_by = Some(approver.trim().to_string());
            r.approval_date = Some(today());
            if note.is_some() {
                r.notes = note;
            }
        })
        .await
    }

    /// Record how the asset left and remove it from the register.
    pub async fn complete(
        &self,
        id: &str,
        method: &str,
    ) -> Result<Persisted<DisposalRequest>, ServiceError> {
        required("disposal method", method)?;
        self.transition(id, DisposalEvent::Complete, |r| {
            r.disposal_method = Some(method.trim().to_string());
        })
        .await
    }

    async fn transition(
        &self,
        id: &str,
        event: DisposalEvent,
        edit: impl FnOnce(&mut DisposalRequest),
    ) -> Result<Persisted<DisposalRequest>, ServiceError> {
        let request: DisposalRequest = self.store.get(id).await?;
        let step = fire(DISPOSAL_TRANSITIONS, request.status, event)?;

        let mut next = request.clone();
        next.status = step.to;
        edit(&mut next);

        let mut ops = vec![WriteOp::update(&request, &next)?];
        if step.asset != AssetEffect::Keep {
            if let Some(asset) = related_asset(self.store, &request.asset_id).await? {
                ops.extend(asset_write(&asset, step.asset)?);
            }
        }
        let applied = self.store.apply(ops).await?;
        info!(request = %id, event = ?event, status = %next.status, "disposal transition");
        Ok(Persisted {
            origin: applied.origin,
            value: applied.record(0, next),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewAsset;
    use assettrack_kv::MemoryStore;
    use std::sync::Arc;

    async fn setup() -> (StorageFacade, String) {
        let facade = StorageFacade::new(Arc::new(MemoryStore::new()), None);
        let id = facade
            .create_asset(NewAsset {
                name: "Old printer".into(),
                category: "IT Equipment".into(),
                department: "Treasury Office".into(),
                status: Some(AssetStatus::InStorage),
                ..Default::default()
            })
            .await
            .unwrap()
            .value
            .id;
        (facade, id)
    }

    fn input() -> NewDisposalRequest {
        NewDisposalRequest {
            reason: "Beyond economical repair".into(),
            requested_by: "Property Officer".into(),
            estimated_value: Some(300.0),
            notes: None,
        }
    }

    #[tokio::test]
    async fn request_approve_complete_removes_asset() {
        let (facade, asset_id) = setup().await;
        let wf = facade.disposal();

        let request = wf.request(&asset_id, input()).await.unwrap().value;
        assert_eq!(request.status, DisposalStatus::PendingApproval);
        assert_eq!(
            facade.get_asset(&asset_id).await.unwrap().status,
            AssetStatus::PendingDisposal
        );

        let approved = wf.approve(&request.id, "Municipal Administrator").await.unwrap().value;
        assert_eq!(approved.approval_date, Some(today()));
        assert_eq!(
            facade.get_asset(&asset_id).await.unwrap().status,
            AssetStatus::PendingDisposal
        );

        let done = wf.complete(&request.id, "Public auction").await.unwrap().value;
        assert_eq!(done.status, DisposalStatus::Completed);
        assert_eq!(done.disposal_method.as_deref(), Some("Public auction"));
        assert!(matches!(
            facade.get_asset(&asset_id).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert_eq!(facade.get_disposal_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reject_returns_asset_to_storage() {
        let (facade, asset_id) = setup().await;
        let wf = facade.disposal();
        let request = wf.request(&asset_id, input()).await.unwrap().value;

        let rejected = wf
            .reject(&request.id, "Mayor", Some("Reassign to barangay hall".into()))
            .await
            .unwrap()
            .value;
        assert_eq!(rejected.status, DisposalStatus::Rejected);
        assert_eq!(rejected.notes.as_deref(), Some("Reassign to barangay hall"));
        assert_eq!(
            facade.get_asset(&asset_id).await.unwrap().status,
            AssetStatus::InStorage
        );
    }

    #[tokio::test]
    async fn complete_requires_approval() {
        let (facade, asset_id) = setup().await;
        let wf = facade.disposal();
        let request = wf.request(&asset_id, input()).await.unwrap().value;

        let err = wf.complete(&request.id, "Scrap").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(facade.get_asset(&asset_id).await.is_ok());

        let again = wf.request(&asset_id, input()).await.unwrap_err();
        assert!(matches!(again, ServiceError::Conflict(_)));
    }
}
