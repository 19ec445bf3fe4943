//! Calendar download endpoint

use axum::{
    Router,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/query-leagues", get(query_leagues))
}

#[derive(Deserialize)]
pub struct CalendarQuery {
    /// Comma-separated league slugs.
    #[serde(default)]
    leagues: String,
}

/// GET /api/query-leagues?leagues=slug1,slug2 - the combined calendar for
/// the requested leagues as an .ics attachment. 400 when the list is empty
/// after trimming.
async fn query_leagues(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, AppError> {
    let slugs: Vec<String> = query.leagues.split(',').map(str::to_string).collect();
    let bytes = state.cache.get_or_render(&state.store, &slugs)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"cal.ics\"",
            ),
        ],
        bytes,
    )
        .into_response())
}
