//! Cross-entity status transitions.
//!
//! Each workflow is a transition table: for an event, the states it may
//! fire from, the state it leads to, and what it does to the asset the
//! record concerns. Firing a transition builds one changeset (the record
//! write plus the paired asset write) and hands it to
//! [`StorageFacade::apply`], so both writes land together or not at all.
//! An event that is not allowed from the current state is rejected before
//! anything is written.

mod custody;
mod disposal;
mod maintenance;

use std::fmt;

use assettrack_core::ServiceError;
use tracing::warn;

use crate::model::{Asset, AssetStatus};
use crate::service::{StorageFacade, WriteOp};

pub use custody::CustodyWorkflow;
pub use disposal::{DISPOSAL_TRANSITIONS, DisposalEvent, DisposalWorkflow};
pub use maintenance::{MAINTENANCE_TRANSITIONS, MaintenanceEvent, MaintenanceWorkflow};

/// What a transition does to the related asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetEffect {
    Keep,
    Set(AssetStatus),
    Remove,
}

/// One row of a transition table.
#[derive(Debug)]
pub struct Transition<S: 'static, E> {
    pub event: E,
    pub from: &'static [S],
    pub to: S,
    pub asset: AssetEffect,
}

/// Look up the transition for `event` from `state`.
pub fn fire<S, E>(
    table: &'static [Transition<S, E>],
    state: S,
    event: E,
) -> Result<&'static Transition<S, E>, ServiceError>
where
    S: Copy + PartialEq + fmt::Display,
    E: Copy + PartialEq + fmt::Debug,
{
    table
        .iter()
        .find(|t| t.event == event && t.from.contains(&state))
        .ok_or_else(|| {
            ServiceError::Validation(format!(
                "cannot {} from status '{}'",
                format!("{:?}", event).to_lowercase(),
                state
            ))
        })
}

/// The asset write for `effect`, if any.
pub(crate) fn asset_write(asset: &Asset, effect: AssetEffect) -> Result<Option<WriteOp>, ServiceError> {
    match effect {
        AssetEffect::Keep => Ok(None),
        AssetEffect::Set(status) if status == asset.status => Ok(None),
        AssetEffect::Set(status) => {
            let next = with_status(asset, status);
            Ok(Some(WriteOp::update(asset, &next)?))
        }
        AssetEffect::Remove => Ok(Some(WriteOp::delete(asset)?)),
    }
}

pub(crate) fn with_status(asset: &Asset, status: AssetStatus) -> Asset {
    let mut next = asset.clone();
    next.status = status;
    crate::store::Entity::before_update(&mut next);
    next
}

/// The asset a record points at, tolerating one that is already gone.
pub(crate) async fn related_asset(
    facade: &StorageFacade,
    asset_id: &str,
) -> Result<Option<Asset>, ServiceError> {
    let asset = facade.find::<Asset>(asset_id).await?;
    if asset.is_none() {
        warn!(asset_id, "record refers to a missing asset, skipping asset update");
    }
    Ok(asset)
}

impl StorageFacade {
    pub fn maintenance(&self) -> MaintenanceWorkflow<'_> {
        MaintenanceWorkflow::new(self)
    }

    pub fn disposal(&self) -> DisposalWorkflow<'_> {
        DisposalWorkflow::new(self)
    }

    pub fn custody(&self) -> CustodyWorkflow<'_> {
        CustodyWorkflow::new(self)
    }
}
