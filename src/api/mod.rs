//! API handlers for the catalog REST endpoints

pub mod auth;
pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod health;
pub mod index;
pub mod loans;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Where a successful renewal sends the client
pub const BORROWED_PATH: &str = "/api/v1/borrowed";

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Local calendar date used for overdue flags and the renewal window
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/", get(index::index))
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", axum::routing::post(auth::login))
        .route("/auth/me", get(auth::me))
        // Users
        .route("/users", axum::routing::post(users::create_user))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // Genres and languages
        .route("/genres", get(genres::list_genres).post(genres::create_genre))
        .route(
            "/genres/:id",
            get(genres::get_genre).put(genres::update_genre).delete(genres::delete_genre),
        )
        .route("/languages", get(genres::list_languages).post(genres::create_language))
        .route(
            "/languages/:id",
            get(genres::get_language)
                .put(genres::update_language)
                .delete(genres::delete_language),
        )
        // Book instances
        .route(
            "/book-instances",
            get(book_instances::list_book_instances).post(book_instances::create_book_instance),
        )
        .route(
            "/book-instances/:id",
            get(book_instances::get_book_instance)
                .put(book_instances::update_book_instance)
                .delete(book_instances::delete_book_instance),
        )
        .route(
            "/book-instances/:id/renew",
            get(book_instances::renewal_form).post(book_instances::renew_book_instance),
        )
        // Loans
        .route("/mybooks", get(loans::my_books))
        .route("/borrowed", get(loans::all_borrowed))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
