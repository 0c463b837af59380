//! Book instance administration and renewal endpoints

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstanceQuery, BookInstanceView, CreateBookInstance, UpdateBookInstance},
        renewal::{RenewalOutcome, RenewalPage, RenewalSubmission},
    },
};

use super::{today, AuthenticatedUser, BORROWED_PATH};

/// List book instances
#[utoipa::path(
    get,
    path = "/book-instances",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(BookInstanceQuery),
    responses(
        (status = 200, description = "Book instances ordered by due date", body = Vec<BookInstanceView>),
        (status = 403, description = "Missing can_mark_returned")
    )
)]
pub async fn list_book_instances(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookInstanceQuery>,
) -> AppResult<Json<Vec<BookInstanceView>>> {
    claims.require_can_mark_returned()?;

    let instances = state.services.catalog.list_instances(&query, today()).await?;
    Ok(Json(instances))
}

/// Get a book instance by ID
#[utoipa::path(
    get,
    path = "/book-instances/{id}",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Book instance", body = BookInstanceView),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn get_book_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstanceView>> {
    claims.require_can_mark_returned()?;

    let instance = state.services.catalog.get_instance(id, today()).await?;
    Ok(Json(instance))
}

/// Create a book instance
#[utoipa::path(
    post,
    path = "/book-instances",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Book instance created", body = BookInstanceView),
        (status = 400, description = "Invalid input"),
        (status = 422, description = "Due date outside the renewal window")
    )
)]
pub async fn create_book_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(instance): Json<CreateBookInstance>,
) -> AppResult<(StatusCode, Json<BookInstanceView>)> {
    claims.require_can_mark_returned()?;

    let created = state.services.catalog.create_instance(instance, today()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a book instance
#[utoipa::path(
    put,
    path = "/book-instances/{id}",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = UpdateBookInstance,
    responses(
        (status = 200, description = "Book instance updated", body = BookInstanceView),
        (status = 404, description = "Book instance not found"),
        (status = 422, description = "Due date outside the renewal window")
    )
)]
pub async fn update_book_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(instance): Json<UpdateBookInstance>,
) -> AppResult<Json<BookInstanceView>> {
    claims.require_can_mark_returned()?;

    let updated = state.services.catalog.update_instance(id, instance, today()).await?;
    Ok(Json(updated))
}

/// Delete a book instance
#[utoipa::path(
    delete,
    path = "/book-instances/{id}",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 204, description = "Book instance deleted"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn delete_book_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_can_mark_returned()?;

    state.services.catalog.delete_instance(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Renewal form with the proposed date (three weeks from today)
#[utoipa::path(
    get,
    path = "/book-instances/{id}/renew",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Renewal form", body = RenewalPage),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalPage>> {
    claims.require_can_mark_returned()?;

    let page = state.services.loans.renewal_form(id, today()).await?;
    Ok(Json(page))
}

/// Submit a renewal date
#[utoipa::path(
    post,
    path = "/book-instances/{id}/renew",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewalSubmission,
    responses(
        (status = 303, description = "Renewed, redirects to the borrowed list"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Book instance not found"),
        (status = 422, description = "Date refused or unreadable, form re-presented", body = RenewalPage)
    )
)]
pub async fn renew_book_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> AppResult<Response> {
    claims.require_can_mark_returned()?;

    let today = today();
    let submission = match RenewalSubmission::from_body(&body) {
        Ok(submission) => submission,
        Err(error) => {
            let page = state.services.loans.reject_unreadable(id, error, today).await?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(page)).into_response());
        }
    };

    let response = match state.services.loans.renew(id, &submission, today).await? {
        RenewalOutcome::Renewed { .. } => Redirect::to(BORROWED_PATH).into_response(),
        RenewalOutcome::Rejected(page) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(page)).into_response()
        }
    };
    Ok(response)
}
