use assettrack_core::ServiceError;
use serde::{Deserialize, Serialize};

labeled_enum! {
    UserRole {
        Admin => ("admin", "admin"),
        DepartmentHead => ("department_head", "department_head"),
        Staff => ("staff", "staff"),
    }
}

labeled_enum! {
    UserStatus {
        Active => ("active", "active"),
        Inactive => ("inactive", "inactive"),
    }
}

/// A system account as persisted. Never leaves the service: handlers
/// return [`UserProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemUser {
    pub id: String,
    pub name: String,
    pub email: String,
    /// argon2id PHC string.
    pub password_hash: String,
    pub role: UserRole,
    pub department: String,
    pub status: UserStatus,
    pub last_login: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl SystemUser {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            department: self.department.clone(),
            status: self.status,
            last_login: self.last_login.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub department: String,
    pub status: UserStatus,
    pub last_login: Option<String>,
    pub created_at: String,
}

/// Input for creating a user. Fields are optional so that a missing
/// value surfaces as a validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub status: Option<UserStatus>,
}

impl NewUser {
    /// Required name, email and password, all non-blank, in that order.
    pub fn required(&self) -> Result<(&str, &str, &str), ServiceError> {
        fn field<'a>(name: &str, value: &'a Option<String>) -> Result<&'a str, ServiceError> {
            match value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => Ok(v),
                _ => Err(ServiceError::Validation(format!("{} is required", name))),
            }
        }
        Ok((
            field("name", &self.name)?,
            field("email", &self.email)?,
            field("password", &self.password)?,
        ))
    }
}

/// Hash a plain password with argon2id.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    use argon2::Argon2;
    use password_hash::rand_core::OsRng;
    use password_hash::{PasswordHasher, SaltString};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ServiceError::Internal(format!("hash password: {}", e)))
}

/// Verify a password against an argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::Argon2;
    use password_hash::{PasswordHash, PasswordVerifier};

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret", "not-a-hash"));
    }

    #[test]
    fn required_fields() {
        let input = NewUser {
            name: Some("Ana".into()),
            email: Some("  ".into()),
            password: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(input.required().unwrap_err().to_string(), "email is required");

        let input = NewUser {
            name: Some("Ana".into()),
            email: Some("ana@lgu.gov.ph".into()),
            password: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(input.required().unwrap().1, "ana@lgu.gov.ph");
    }

    #[test]
    fn profile_omits_hash() {
        let user = SystemUser {
            id: "u1".into(),
            name: "Ana".into(),
            email: "ana@lgu.gov.ph".into(),
            password_hash: "$argon2id$secret".into(),
            role: UserRole::Staff,
            department: "Health Office".into(),
            status: UserStatus::Active,
            last_login: None,
            created_at: String::new(),
        };
        let json = serde_json::to_string(&user.profile()).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"staff\""));
    }
}
