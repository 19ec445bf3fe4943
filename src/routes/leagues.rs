//! League listing endpoints

use axum::{
    Json, Router,
    extract::State,
    response::Html,
    routing::get,
};
use serde::Serialize;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(front_page))
        .route("/api/leagues", get(list_leagues))
}

/// League info returned by the API
#[derive(Serialize)]
pub struct LeagueInfo {
    pub id: String,
    pub slug: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct LeaguesResponse {
    pub leagues: Vec<LeagueInfo>,
}

/// GET /api/leagues - leagues in front-page (priority) order
async fn list_leagues(State(state): State<AppState>) -> Result<Json<LeaguesResponse>, AppError> {
    let leagues = state
        .store
        .leagues_by_priority()?
        .into_iter()
        .map(|league| LeagueInfo {
            id: league.id,
            slug: league.slug,
            name: league.name,
        })
        .collect();

    Ok(Json(LeaguesResponse { leagues }))
}

/// GET / - front page listing leagues by priority
async fn front_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let leagues = state.store.leagues_by_priority()?;

    let mut items = String::new();
    for league in &leagues {
        items.push_str(&format!(
            "      <li><img src=\"{}\" alt=\"\" width=\"24\" height=\"24\"> \
             <a href=\"/api/query-leagues?leagues={}\">{}</a> <small>{}</small></li>\n",
            league.image_url, league.slug, league.name, league.region
        ));
    }

    Ok(Html(format!(
        "<!doctype html>\n\
         <html lang=\"en\">\n\
         <head>\n\
           <meta charset=\"utf-8\">\n\
           <title>LoL eSports Calendar</title>\n\
         </head>\n\
         <body>\n\
           <h1>LoL eSports Calendar</h1>\n\
           <p>Pick a league to download its schedule as an .ics calendar.</p>\n\
           <ul>\n{items}    </ul>\n\
         </body>\n\
         </html>\n"
    )))
}
