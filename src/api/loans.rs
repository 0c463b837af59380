//! Borrowed book lists

use axum::{extract::State, Json};

use crate::{error::AppResult, models::book_instance::BookInstanceView};

use super::{today, AuthenticatedUser};

/// Books on loan to the current user
#[utoipa::path(
    get,
    path = "/mybooks",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Copies on loan, soonest due first", body = Vec<BookInstanceView>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookInstanceView>>> {
    let books = state.services.loans.borrowed_by(claims.user_id, today()).await?;
    Ok(Json(books))
}

/// All books on loan
#[utoipa::path(
    get,
    path = "/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Copies on loan, soonest due first", body = Vec<BookInstanceView>),
        (status = 403, description = "Missing can_mark_returned")
    )
)]
pub async fn all_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookInstanceView>>> {
    claims.require_can_mark_returned()?;

    let books = state.services.loans.all_borrowed(today()).await?;
    Ok(Json(books))
}
