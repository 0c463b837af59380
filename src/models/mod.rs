//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod pagination;
pub mod renewal;
pub mod summary;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookShort};
pub use book_instance::{BookInstance, BookInstanceView, LoanStatus};
pub use genre::{Genre, Language};
pub use pagination::Pagination;
pub use summary::CatalogSummary;
pub use user::{Permission, User, UserClaims};
