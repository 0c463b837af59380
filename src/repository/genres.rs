//! Genres and languages repository
//!
//! Both are single-column reference tables, so one repository type serves
//! each, parameterised by the row type.

use std::marker::PhantomData;

use sqlx::{postgres::PgRow, FromRow, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::genre::{Genre, Language},
};

pub struct NamedEntriesRepository<T> {
    pool: Pool<Postgres>,
    table: &'static str,
    label: &'static str,
    _row: PhantomData<fn() -> T>,
}

impl<T> Clone for NamedEntriesRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            table: self.table,
            label: self.label,
            _row: PhantomData,
        }
    }
}

pub type GenresRepository = NamedEntriesRepository<Genre>;
pub type LanguagesRepository = NamedEntriesRepository<Language>;

impl NamedEntriesRepository<Genre> {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool, table: "genres", label: "Genre", _row: PhantomData }
    }
}

impl NamedEntriesRepository<Language> {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool, table: "languages", label: "Language", _row: PhantomData }
    }
}

impl<T> NamedEntriesRepository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    fn not_found(&self, id: i32) -> AppError {
        AppError::NotFound(format!("{} with id {} not found", self.label, id))
    }

    /// List entries ordered by name
    pub async fn list(&self) -> AppResult<Vec<T>> {
        let sql = format!("SELECT id, name FROM {} ORDER BY name", self.table);
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    /// Get entry by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<T> {
        let sql = format!("SELECT id, name FROM {} WHERE id = $1", self.table);
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| self.not_found(id))
    }

    /// Get entry by ID when the reference is set
    pub async fn get_optional(&self, id: Option<i32>) -> AppResult<Option<T>> {
        match id {
            Some(id) => Ok(Some(self.get_by_id(id).await?)),
            None => Ok(None),
        }
    }

    /// Create a new entry
    pub async fn create(&self, name: &str) -> AppResult<T> {
        let sql = format!("INSERT INTO {} (name) VALUES ($1) RETURNING id, name", self.table);
        Ok(sqlx::query_as::<_, T>(&sql).bind(name).fetch_one(&self.pool).await?)
    }

    /// Rename an entry
    pub async fn rename(&self, id: i32, name: &str) -> AppResult<T> {
        let sql = format!("UPDATE {} SET name = $2 WHERE id = $1 RETURNING id, name", self.table);
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| self.not_found(id))
    }

    /// Delete an entry; referencing books keep their row
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(self.not_found(id));
        }
        Ok(())
    }
}
