//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{map_constraint_violation, AppError, AppResult},
    models::{
        book::{Book, BookShort, CreateBook, UpdateBook},
        genre::Genre,
        pagination::Pagination,
    },
};

const DUPLICATE_ISBN: &str = "A book with this ISBN already exists";

// Shared projection for list views; display_genre holds the first two genres
const SELECT_SHORT: &str = r#"
    SELECT b.id, b.title, b.author_id,
           CASE WHEN a.id IS NULL THEN NULL ELSE a.last_name || ' ' || a.first_name END AS author_name,
           COALESCE((
               SELECT string_agg(g.name, ', ' ORDER BY g.id)
               FROM (
                   SELECT g2.id, g2.name
                   FROM genres g2
                   JOIN book_genres bg ON bg.genre_id = g2.id
                   WHERE bg.book_id = b.id
                   ORDER BY g2.id
                   LIMIT 2
               ) g
           ), '') AS display_genre
    FROM books b
    LEFT JOIN authors a ON a.id = b.author_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, summary, isbn, author_id, language_id FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Search books ordered by title, returns the page and the total count
    pub async fn search(
        &self,
        title: Option<&str>,
        page: Pagination,
    ) -> AppResult<(Vec<BookShort>, i64)> {
        let pattern = title.map(|t| format!("%{}%", t));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE ($1::text IS NULL OR title ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "{} WHERE ($1::text IS NULL OR b.title ILIKE $1) ORDER BY b.title LIMIT $2 OFFSET $3",
            SELECT_SHORT
        );
        let books = sqlx::query_as::<_, BookShort>(&sql)
            .bind(&pattern)
            .bind(page.per_page)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    /// Books written by an author
    pub async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<BookShort>> {
        let sql = format!("{} WHERE b.author_id = $1 ORDER BY b.title", SELECT_SHORT);
        let books = sqlx::query_as::<_, BookShort>(&sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Genres of a book
    pub async fn get_genres(&self, book_id: i32) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM genres g
            JOIN book_genres bg ON bg.genre_id = g.id
            WHERE bg.book_id = $1
            ORDER BY g.id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    /// Create a new book with its genre links
    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, summary, isbn, author_id, language_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, summary, isbn, author_id, language_id
            "#,
        )
        .bind(&data.title)
        .bind(&data.summary)
        .bind(&data.isbn)
        .bind(data.author_id)
        .bind(data.language_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_violation(e, DUPLICATE_ISBN))?;

        sqlx::query(
            "INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::int[]) ON CONFLICT DO NOTHING",
        )
        .bind(book.id)
        .bind(&data.genre_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_constraint_violation(e, DUPLICATE_ISBN))?;

        tx.commit().await?;
        Ok(book)
    }

    /// Update a book; genre links are replaced when `genre_ids` is present
    pub async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                summary = COALESCE($3, summary),
                isbn = COALESCE($4, isbn),
                author_id = CASE WHEN $5 THEN $6 ELSE author_id END,
                language_id = CASE WHEN $7 THEN $8 ELSE language_id END
            WHERE id = $1
            RETURNING id, title, summary, isbn, author_id, language_id
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.summary)
        .bind(&data.isbn)
        .bind(data.author_id.is_some())
        .bind(data.author_id.flatten())
        .bind(data.language_id.is_some())
        .bind(data.language_id.flatten())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_constraint_violation(e, DUPLICATE_ISBN))?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if let Some(ref genre_ids) = data.genre_ids {
            sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                "INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::int[]) ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(genre_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_constraint_violation(e, DUPLICATE_ISBN))?;
        }

        tx.commit().await?;
        Ok(book)
    }

    /// Delete a book; its copies stay with a null book reference
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
