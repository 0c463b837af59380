//! User model, permissions and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Domain permissions a user may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Set book as returned; gates borrow management and catalog edits
    CanMarkReturned,
}

impl Permission {
    pub fn codename(&self) -> &'static str {
        match self {
            Permission::CanMarkReturned => "can_mark_returned",
        }
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "can_mark_returned" => Ok(Permission::CanMarkReturned),
            _ => Err(format!("Unknown permission: {}", s)),
        }
    }
}

/// User from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub login: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub crea_date: Option<DateTime<Utc>>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 150, message = "Login must be 3 to 150 characters"))]
    pub login: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// Current user with the permissions granted to them
#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub permissions: Vec<Permission>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn require_permission(&self, permission: Permission) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Missing permission: {}",
                permission.codename()
            )))
        }
    }

    /// Borrow management and catalog edits
    pub fn require_can_mark_returned(&self) -> Result<(), AppError> {
        self.require_permission(Permission::CanMarkReturned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: Vec<Permission>) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: "librarian".to_string(),
            user_id: 7,
            permissions,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn permission_check_rejects_plain_patrons() {
        assert!(claims(vec![]).require_can_mark_returned().is_err());
        assert!(claims(vec![Permission::CanMarkReturned])
            .require_can_mark_returned()
            .is_ok());
    }

    #[test]
    fn token_carries_permissions() {
        let token = claims(vec![Permission::CanMarkReturned])
            .create_token("secret")
            .unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 7);
        assert!(parsed.has_permission(Permission::CanMarkReturned));

        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn codename_round_trips() {
        assert_eq!(
            Permission::CanMarkReturned.codename().parse::<Permission>(),
            Ok(Permission::CanMarkReturned)
        );
    }
}
