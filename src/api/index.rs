//! Home page

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use uuid::Uuid;

use crate::{error::AppResult, models::CatalogSummary};

pub const SESSION_COOKIE: &str = "sessionid";

/// Catalog counts and the visit counter of the caller's session
#[utoipa::path(
    get,
    path = "/",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog summary", body = CatalogSummary)
    )
)]
pub async fn index(
    State(state): State<crate::AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<CatalogSummary>)> {
    let existing = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned());

    let (jar, session_id) = match existing {
        Some(id) => (jar, id),
        None => {
            let id = Uuid::new_v4().to_string();
            let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
                .path("/")
                .http_only(true);
            (jar.add(cookie), id)
        }
    };

    let num_visits = state.services.sessions.record_visit(&session_id).await?;
    let summary = state.services.catalog.summary(num_visits).await?;

    Ok((jar, Json(summary)))
}
