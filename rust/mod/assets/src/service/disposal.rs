use assettrack_core::ServiceError;
use serde_json::Value;

use crate::model::DisposalRequest;
use crate::model::asset::validate_date;
use crate::service::{Persisted, StorageFacade, patched, required};

impl DisposalRequest {
    pub fn validate(&self) -> Result<(), ServiceError> {
        required("asset", &self.asset_id)?;
        required("reason", &self.reason)?;
        required("requester", &self.requested_by)?;
        validate_date("request date", &self.request_date)?;
        if !self.estimated_value.is_finite() || self.estimated_value < 0.0 {
            return Err(ServiceError::Validation(
                "estimated value must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}

impl StorageFacade {
    pub async fn get_disposal_requests(&self) -> Result<Vec<DisposalRequest>, ServiceError> {
        self.list().await
    }

    pub async fn create_disposal_request(
        &self,
        request: DisposalRequest,
    ) -> Result<Persisted<DisposalRequest>, ServiceError> {
        request.validate()?;
        self.create(request).await
    }

    pub async fn update_disposal_request(
        &self,
        id: &str,
        patch: &Value,
    ) -> Result<Persisted<DisposalRequest>, ServiceError> {
        let current: DisposalRequest = self.get(id).await?;
        let next = patched(&current, patch)?;
        next.validate()?;
        self.replace(&current, next).await
    }
}
