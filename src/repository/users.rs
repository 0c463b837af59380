//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{map_constraint_violation, AppError, AppResult},
    models::user::{Permission, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by login (case-insensitive)
    pub async fn get_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(login) = LOWER($1)")
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Permissions granted to a user; unknown codenames are skipped
    pub async fn get_permissions(&self, user_id: i32) -> AppResult<Vec<Permission>> {
        let codenames: Vec<String> =
            sqlx::query_scalar("SELECT codename FROM user_permissions WHERE user_id = $1 ORDER BY codename")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(codenames
            .iter()
            .filter_map(|c| match c.parse() {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("Ignoring permission for user {}: {}", user_id, e);
                    None
                }
            })
            .collect())
    }

    /// Create a user with an already hashed password and its permissions
    pub async fn create(
        &self,
        login: &str,
        password_hash: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        permissions: &[Permission],
    ) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (login, password, first_name, last_name, email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(login)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_violation(e, "A user with this login already exists"))?;

        for permission in permissions {
            sqlx::query(
                "INSERT INTO user_permissions (user_id, codename) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(user.id)
            .bind(permission.codename())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(user)
    }
}
