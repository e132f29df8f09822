//! Assignment and transfer records.
//!
//! These are the plain record operations. Handing an asset to someone, with
//! the matching asset update, is [`crate::workflow::CustodyWorkflow`].

use assettrack_core::ServiceError;
use serde_json::Value;

use crate::model::asset::{DEPARTMENTS, canonical, validate_date};
use crate::model::{Assignment, Transfer};
use crate::service::{Persisted, StorageFacade, patched, required};

pub(crate) fn canonical_department(value: &str) -> Result<String, ServiceError> {
    canonical(DEPARTMENTS, value)
        .map(str::to_string)
        .ok_or_else(|| ServiceError::Validation(format!("invalid department '{}'", value)))
}

impl Assignment {
    pub fn validate(&mut self) -> Result<(), ServiceError> {
        required("asset", &self.asset_id)?;
        required("assignee", &self.assigned_to)?;
        self.department = canonical_department(&self.department)?;
        validate_date("assigned date", &self.assigned_date)?;
        if let Some(due) = self.due_date.as_deref() {
            validate_date("due date", due)?;
            if due < self.assigned_date.as_str() {
                return Err(ServiceError::Validation(
                    "due date is before the assigned date".into(),
                ));
            }
        }
        Ok(())
    }
}

impl Transfer {
    pub fn validate(&mut self) -> Result<(), ServiceError> {
        required("asset", &self.asset_id)?;
        required("new holder", &self.to_holder)?;
        required("approver", &self.approved_by)?;
        self.to_department = canonical_department(&self.to_department)?;
        Ok(())
    }
}

impl StorageFacade {
    pub async fn get_assignments(&self) -> Result<Vec<Assignment>, ServiceError> {
        self.list().await
    }

    pub async fn create_assignment(
        &self,
        mut assignment: Assignment,
    ) -> Result<Persisted<Assignment>, ServiceError> {
        assignment.validate()?;
        self.create(assignment).await
    }

    pub async fn update_assignment(
        &self,
        id: &str,
        patch: &Value,
    ) -> Result<Persisted<Assignment>, ServiceError> {
        let current: Assignment = self.get(id).await?;
        let mut next = patched(&current, patch)?;
        next.validate()?;
        self.replace(&current, next).await
    }

    pub async fn get_transfers(&self) -> Result<Vec<Transfer>, ServiceError> {
        self.list().await
    }

    /// Record a transfer. Transfers are history and have no update.
    pub async fn create_transfer(
        &self,
        mut transfer: Transfer,
    ) -> Result<Persisted<Transfer>, ServiceError> {
        transfer.validate()?;
        self.create(transfer).await
    }
}
