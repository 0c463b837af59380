//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, Permission, User, UserClaims, UserProfile},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate user by login and return a JWT token
    pub async fn authenticate(&self, login: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_login(login)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid login or password".to_string()))?;

        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        if !verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid login or password".to_string()));
        }

        let permissions = self.repository.users.get_permissions(user.id).await?;
        let token = self.create_token(&user, permissions)?;

        tracing::info!("User {} logged in", user.login);
        Ok((token, user))
    }

    fn create_token(&self, user: &User, permissions: Vec<Permission>) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.login.clone(),
            user_id: user.id,
            permissions,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Profile of the authenticated user
    pub async fn me(&self, user_id: i32) -> AppResult<UserProfile> {
        let user = self.repository.users.get_by_id(user_id).await?;
        let permissions = self.repository.users.get_permissions(user_id).await?;
        Ok(UserProfile { user, permissions })
    }

    /// Create a new user with a hashed password
    pub async fn create_user(&self, data: CreateUser) -> AppResult<UserProfile> {
        data.validate()?;

        let hash = hash_password(&data.password)?;
        let user = self
            .repository
            .users
            .create(
                &data.login,
                &hash,
                data.first_name.as_deref(),
                data.last_name.as_deref(),
                data.email.as_deref(),
                &data.permissions,
            )
            .await?;

        tracing::info!("Created user {} with permissions {:?}", user.login, data.permissions);
        Ok(UserProfile {
            user,
            permissions: data.permissions,
        })
    }

    /// Create the configured librarian account unless its login is taken
    pub async fn ensure_bootstrap_user(&self) -> AppResult<()> {
        let (Some(login), Some(password)) = (
            self.config.bootstrap_login.as_deref(),
            self.config.bootstrap_password.as_deref(),
        ) else {
            return Ok(());
        };

        if self.repository.users.get_by_login(login).await?.is_some() {
            tracing::debug!("Bootstrap user {} already exists", login);
            return Ok(());
        }

        self.create_user(CreateUser {
            login: login.to_string(),
            password: password.to_string(),
            first_name: None,
            last_name: None,
            email: None,
            permissions: vec![Permission::CanMarkReturned],
        })
        .await?;

        tracing::warn!("Created bootstrap librarian {}; change its password", login);
        Ok(())
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let Some(ref hash) = user.password else {
        return Ok(false);
    };

    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(password: Option<String>) -> User {
        User {
            id: 1,
            login: "reader".to_string(),
            password,
            first_name: None,
            last_name: None,
            email: None,
            is_active: true,
            crea_date: None,
        }
    }

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(hash.starts_with("$argon2"));

        let user = user_with(Some(hash));
        assert!(verify_password(&user, "s3cret!").unwrap());
        assert!(!verify_password(&user, "wrong").unwrap());
    }

    #[test]
    fn user_without_password_cannot_log_in() {
        assert!(!verify_password(&user_with(None), "anything").unwrap());
    }

    #[test]
    fn garbage_hash_is_an_internal_error() {
        let user = user_with(Some("not-a-hash".to_string()));
        assert!(matches!(
            verify_password(&user, "x"),
            Err(AppError::Internal(_))
        ));
    }
}
