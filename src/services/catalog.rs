//! Catalog management service

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetails, CreateAuthor, UpdateAuthor},
        book::{display_genre, Book, BookDetails, BookShort, CreateBook, UpdateBook},
        book_instance::{
            BookInstanceQuery, BookInstanceView, CreateBookInstance, LoanStatus, UpdateBookInstance,
        },
        genre::{Genre, Language, NamedEntry},
        renewal::{RenewBookModelForm, RenewalDateField},
        CatalogSummary, Pagination,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Check the database answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }

    /// Record counts for the index page
    pub async fn summary(&self, num_visits: i64) -> AppResult<CatalogSummary> {
        Ok(CatalogSummary {
            num_books: self.repository.books.count().await?,
            num_instances: self.repository.book_instances.count().await?,
            num_instances_available: self
                .repository
                .book_instances
                .count_with_status(LoanStatus::Available)
                .await?,
            num_authors: self.repository.authors.count().await?,
            num_visits,
        })
    }

    // Books

    /// Search books with filters
    pub async fn search_books(
        &self,
        title: Option<&str>,
        page: Pagination,
    ) -> AppResult<(Vec<BookShort>, i64)> {
        self.repository.books.search(title, page).await
    }

    /// Get book by ID with author, language, genres and copies
    pub async fn get_book(&self, id: i32, today: NaiveDate) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;

        let author = match book.author_id {
            Some(author_id) => Some(self.repository.authors.get_by_id(author_id).await?),
            None => None,
        };
        let language = self.repository.languages.get_optional(book.language_id).await?;
        let genres = self.repository.books.get_genres(id).await?;
        let instances = self
            .repository
            .book_instances
            .list_for_book(id)
            .await?
            .into_iter()
            .map(|i| i.view(today))
            .collect();

        Ok(BookDetails {
            display_genre: display_genre(&genres),
            book,
            author,
            language,
            genres,
            instances,
        })
    }

    pub async fn create_book(&self, data: CreateBook) -> AppResult<Book> {
        data.validate()?;
        let book = self.repository.books.create(&data).await?;
        tracing::info!("Created book {} ({})", book.id, book);
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, data: UpdateBook) -> AppResult<Book> {
        data.validate()?;
        self.repository.books.update(id, &data).await
    }

    /// Delete a book; its copies are kept without a book reference
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book {}", id);
        Ok(())
    }

    // Authors

    /// List authors, one page at a time
    pub async fn list_authors(&self, page: Pagination) -> AppResult<(Vec<Author>, i64)> {
        self.repository.authors.list(page).await
    }

    /// Get author by ID with the books they wrote
    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetails { author, books })
    }

    pub async fn create_author(&self, data: CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        self.repository.authors.create(&data).await
    }

    pub async fn update_author(&self, id: i32, data: UpdateAuthor) -> AppResult<Author> {
        data.validate()?;
        self.repository.authors.update(id, &data).await
    }

    /// Delete an author; their books are kept without an author
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!("Deleted author {}", id);
        Ok(())
    }

    // Genres and languages

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await
    }

    pub async fn create_genre(&self, data: NamedEntry) -> AppResult<Genre> {
        data.validate()?;
        self.repository.genres.create(&data.name).await
    }

    pub async fn rename_genre(&self, id: i32, data: NamedEntry) -> AppResult<Genre> {
        data.validate()?;
        self.repository.genres.rename(id, &data.name).await
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await
    }

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.languages.list().await
    }

    pub async fn get_language(&self, id: i32) -> AppResult<Language> {
        self.repository.languages.get_by_id(id).await
    }

    pub async fn create_language(&self, data: NamedEntry) -> AppResult<Language> {
        data.validate()?;
        self.repository.languages.create(&data.name).await
    }

    pub async fn rename_language(&self, id: i32, data: NamedEntry) -> AppResult<Language> {
        data.validate()?;
        self.repository.languages.rename(id, &data.name).await
    }

    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        self.repository.languages.delete(id).await
    }

    // Book instances

    pub async fn list_instances(
        &self,
        query: &BookInstanceQuery,
        today: NaiveDate,
    ) -> AppResult<Vec<BookInstanceView>> {
        let instances = self.repository.book_instances.list(query).await?;
        Ok(instances.into_iter().map(|i| i.view(today)).collect())
    }

    pub async fn get_instance(&self, id: Uuid, today: NaiveDate) -> AppResult<BookInstanceView> {
        Ok(self.repository.book_instances.get_by_id(id).await?.view(today))
    }

    /// Create a copy; a supplied due date must fall in the renewal window
    pub async fn create_instance(
        &self,
        data: CreateBookInstance,
        today: NaiveDate,
    ) -> AppResult<BookInstanceView> {
        data.validate()?;
        check_due_back(data.due_back, today)?;

        let instance = self.repository.book_instances.create(&data).await?;
        tracing::info!("Created book instance {}", instance);
        Ok(instance.view(today))
    }

    /// Update a copy; a newly supplied due date must fall in the renewal window
    pub async fn update_instance(
        &self,
        id: Uuid,
        data: UpdateBookInstance,
        today: NaiveDate,
    ) -> AppResult<BookInstanceView> {
        data.validate()?;
        check_due_back(data.due_back.flatten(), today)?;

        let instance = self.repository.book_instances.update(id, &data).await?;
        Ok(instance.view(today))
    }

    pub async fn delete_instance(&self, id: Uuid) -> AppResult<()> {
        self.repository.book_instances.delete(id).await?;
        tracing::info!("Deleted book instance {}", id);
        Ok(())
    }
}

fn check_due_back(due_back: Option<NaiveDate>, today: NaiveDate) -> AppResult<()> {
    if let Some(due_back) = due_back {
        RenewBookModelForm { due_back }.clean(today)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, services::loan_policy::RenewalError};
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 8).unwrap()
    }

    #[test]
    fn admin_due_dates_follow_renewal_window() {
        assert!(check_due_back(None, today()).is_ok());
        assert!(check_due_back(Some(today()), today()).is_ok());
        assert!(matches!(
            check_due_back(Some(today() - Duration::days(1)), today()),
            Err(AppError::Renewal(RenewalError::PastDate))
        ));
        assert!(matches!(
            check_due_back(Some(today() + Duration::days(29)), today()),
            Err(AppError::Renewal(RenewalError::RangeExceeded))
        ));
    }
}
