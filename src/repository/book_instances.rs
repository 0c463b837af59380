//! Book instances repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{map_constraint_violation, AppError, AppResult},
    models::book_instance::{
        BookInstance, BookInstanceQuery, CreateBookInstance, LoanStatus, UpdateBookInstance,
    },
};

const SELECT_WITH_TITLE: &str = r#"
    SELECT bi.id, bi.book_id, bi.imprint, bi.due_back, bi.status, bi.borrower_id,
           b.title AS book_title
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book_id
"#;

/// Store operations the loan flow depends on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    /// Look up a copy by its identity token
    async fn find(&self, id: Uuid) -> AppResult<Option<BookInstance>>;

    /// Overwrite the due date; concurrent writers are last-write-wins
    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()>;

    /// Copies on loan ordered by due date, optionally for one borrower
    async fn list_on_loan(&self, borrower_id: Option<i32>) -> AppResult<Vec<BookInstance>>;
}

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book instance by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// List book instances, optionally filtered
    pub async fn list(&self, query: &BookInstanceQuery) -> AppResult<Vec<BookInstance>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.status.is_some() {
            conditions.push(format!("bi.status = ${}", idx));
            idx += 1;
        }
        if query.borrower_id.is_some() {
            conditions.push(format!("bi.borrower_id = ${}", idx));
            idx += 1;
        }
        if query.book_id.is_some() {
            conditions.push(format!("bi.book_id = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!("{} {} ORDER BY bi.due_back", SELECT_WITH_TITLE, where_clause);

        let mut builder = sqlx::query_as::<_, BookInstance>(&sql);
        if let Some(status) = query.status {
            builder = builder.bind(status);
        }
        if let Some(borrower_id) = query.borrower_id {
            builder = builder.bind(borrower_id);
        }
        if let Some(book_id) = query.book_id {
            builder = builder.bind(book_id);
        }

        Ok(builder.fetch_all(&self.pool).await?)
    }

    /// List copies of a book
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        self.list(&BookInstanceQuery {
            book_id: Some(book_id),
            ..Default::default()
        })
        .await
    }

    /// Create a new book instance with a fresh identity token
    pub async fn create(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, status, borrower_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(data.book_id)
        .bind(&data.imprint)
        .bind(data.due_back)
        .bind(data.status)
        .bind(data.borrower_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint_violation(e, "Book instance already exists"))?;

        self.get_by_id(id).await
    }

    /// Update a book instance; each nullable column has a "set" flag so
    /// explicit nulls can be told apart from absent fields
    pub async fn update(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances SET
                book_id = CASE WHEN $2 THEN $3 ELSE book_id END,
                imprint = COALESCE($4, imprint),
                due_back = CASE WHEN $5 THEN $6 ELSE due_back END,
                status = COALESCE($7, status),
                borrower_id = CASE WHEN $8 THEN $9 ELSE borrower_id END
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(data.book_id.is_some())
        .bind(data.book_id.flatten())
        .bind(&data.imprint)
        .bind(data.due_back.is_some())
        .bind(data.due_back.flatten())
        .bind(data.status)
        .bind(data.borrower_id.is_some())
        .bind(data.borrower_id.flatten())
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint_violation(e, "Book instance already exists"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete a book instance
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    /// Count all book instances
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count book instances with a given status
    pub async fn count_with_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl BookInstanceStore for BookInstancesRepository {
    async fn find(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        let sql = format!("{} WHERE bi.id = $1", SELECT_WITH_TITLE);
        let instance = sqlx::query_as::<_, BookInstance>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(instance)
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let result = sqlx::query("UPDATE book_instances SET due_back = $1 WHERE id = $2")
            .bind(due_back)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    async fn list_on_loan(&self, borrower_id: Option<i32>) -> AppResult<Vec<BookInstance>> {
        self.list(&BookInstanceQuery {
            status: Some(LoanStatus::OnLoan),
            borrower_id,
            book_id: None,
        })
        .await
    }
}
