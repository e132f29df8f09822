use assettrack_core::{ServiceError, now_rfc3339};
use serde_json::Value;
use tracing::{info, warn};

use crate::model::asset::{DEPARTMENTS, canonical};
use crate::model::user::{hash_password, verify_password};
use crate::model::{NewUser, SystemUser, UserProfile, UserRole, UserStatus};
use crate::service::{Persisted, StorageFacade, patched};

fn validate_email(email: &str) -> Result<(), ServiceError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(ServiceError::Validation(format!("invalid email '{}'", email)));
    }
    Ok(())
}

/// Argon2 runs on the blocking pool, not on an async worker.
async fn hash_blocking(password: &str) -> Result<String, ServiceError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ServiceError::Internal(format!("password hashing task failed: {}", e)))?
}

async fn verify_blocking(password: &str, hash: &str) -> bool {
    let (password, hash) = (password.to_string(), hash.to_string());
    match tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await {
        Ok(valid) => valid,
        Err(e) => {
            warn!(error = %e, "password verification task failed");
            false
        }
    }
}

/// Blank, or one of the fixed departments in canonical spelling.
fn user_department(value: &str) -> Result<String, ServiceError> {
    if value.trim().is_empty() {
        return Ok(String::new());
    }
    canonical(DEPARTMENTS, value)
        .map(str::to_string)
        .ok_or_else(|| ServiceError::Validation(format!("invalid department '{}'", value)))
}

impl StorageFacade {
    pub async fn get_users(&self) -> Result<Vec<SystemUser>, ServiceError> {
        self.list().await
    }

    pub async fn get_user(&self, id: &str) -> Result<SystemUser, ServiceError> {
        self.get(id).await
    }

    /// Create an account. The password is hashed before anything is written.
    pub async fn create_user(&self, input: NewUser) -> Result<Persisted<SystemUser>, ServiceError> {
        let (name, email, password) = input.required()?;
        validate_email(email)?;
        self.check_email_free(email, None).await?;

        let user = SystemUser {
            id: String::new(),
            name: name.to_string(),
            email: email.to_lowercase(),
            password_hash: hash_blocking(password).await?,
            role: input.role.unwrap_or(UserRole::Staff),
            department: user_department(input.department.as_deref().unwrap_or(""))?,
            status: input.status.unwrap_or(UserStatus::Active),
            last_login: None,
            created_at: String::new(),
        };
        let created = self.create(user).await?;
        info!(id = %created.value.id, origin = ?created.origin, "created user");
        Ok(created)
    }

    /// Merge-patch an account. A `password` key is hashed into the stored
    /// hash; the hash itself cannot be patched directly.
    pub async fn update_user(&self, id: &str, patch: &Value) -> Result<Persisted<SystemUser>, ServiceError> {
        let current: SystemUser = self.get(id).await?;
        let mut patch = patch.clone();
        let password = match patch.as_object_mut() {
            Some(fields) => {
                fields.remove("passwordHash");
                fields.remove("password")
            }
            None => None,
        };
        let mut next = patched(&current, &patch)?;
        if let Some(password) = password {
            let password = password
                .as_str()
                .filter(|p| !p.is_empty())
                .ok_or_else(|| ServiceError::Validation("password is required".into()))?;
            next.password_hash = hash_blocking(password).await?;
        }
        if next.name.trim().is_empty() {
            return Err(ServiceError::Validation("name is required".into()));
        }
        validate_email(&next.email)?;
        next.email = next.email.to_lowercase();
        if next.email != current.email {
            self.check_email_free(&next.email, Some(id)).await?;
        }
        next.department = user_department(&next.department)?;
        self.replace(&current, next).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<Persisted<SystemUser>, ServiceError> {
        self.delete(id).await
    }

    /// Check credentials. Unknown emails, wrong passwords and inactive
    /// accounts all yield `None`. A successful check stamps `last_login`.
    pub async fn authenticate_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, ServiceError> {
        let email = email.trim();
        let user = self
            .get_users()
            .await?
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email));
        let Some(user) = user else {
            return Ok(None);
        };
        if user.status != UserStatus::Active || !verify_blocking(password, &user.password_hash).await {
            return Ok(None);
        }
        let mut next = user.clone();
        next.last_login = Some(now_rfc3339());
        let stored = self.replace(&user, next).await?;
        Ok(Some(stored.value.profile()))
    }

    async fn check_email_free(&self, email: &str, except: Option<&str>) -> Result<(), ServiceError> {
        let taken = self
            .get_users()
            .await?
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id.as_str()) != except);
        if taken {
            return Err(ServiceError::Conflict(format!(
                "a user with email '{}' already exists",
                email
            )));
        }
        Ok(())
    }
}
