//! Book (bibliographic record) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{
    author::Author,
    book_instance::BookInstanceView,
    genre::{Genre, Language},
};

/// Number of genres shown in list views
const DISPLAY_GENRE_LIMIT: usize = 2;

/// Book from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub summary: String,
    /// 13 character ISBN
    pub isbn: String,
    pub author_id: Option<i32>,
    pub language_id: Option<i32>,
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    /// "last_name first_name" of the author, if any
    pub author_name: Option<String>,
    /// First genres joined by ", "
    pub display_genre: String,
}

/// Book with its author, language, genres and copies
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub author: Option<Author>,
    pub language: Option<Language>,
    pub genres: Vec<Genre>,
    pub display_genre: String,
    pub instances: Vec<BookInstanceView>,
}

/// Join the names of the first genres for display
pub fn display_genre(genres: &[Genre]) -> String {
    genres
        .iter()
        .take(DISPLAY_GENRE_LIMIT)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Book query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters"))]
    pub title: String,
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    #[serde(default)]
    pub summary: String,
    #[validate(length(equal = 13, message = "ISBN must be exactly 13 characters"))]
    pub isbn: String,
    pub author_id: Option<i32>,
    pub language_id: Option<i32>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

/// Update book request; absent fields are left untouched
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    pub summary: Option<String>,
    #[validate(length(equal = 13, message = "ISBN must be exactly 13 characters"))]
    pub isbn: Option<String>,
    #[serde(default, with = "serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub author_id: Option<Option<i32>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub language_id: Option<Option<i32>>,
    /// Replaces the whole genre set when present
    pub genre_ids: Option<Vec<i32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre(id: i32, name: &str) -> Genre {
        Genre { id, name: name.to_string() }
    }

    #[test]
    fn display_genre_keeps_first_two() {
        let genres = vec![genre(1, "Fantasy"), genre(2, "Adventure"), genre(3, "Horror")];
        assert_eq!(display_genre(&genres), "Fantasy, Adventure");
        assert_eq!(display_genre(&genres[..1]), "Fantasy");
        assert_eq!(display_genre(&[]), "");
    }

    #[test]
    fn isbn_must_be_thirteen_characters() {
        let mut book = CreateBook {
            title: "Dune".to_string(),
            summary: String::new(),
            isbn: "9780441172719".to_string(),
            author_id: None,
            language_id: None,
            genre_ids: vec![],
        };
        assert!(book.validate().is_ok());

        book.isbn = "044117271".to_string();
        assert!(book.validate().is_err());
    }
}
