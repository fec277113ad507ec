//! Display-facing reads. Unknown platform names read as defaults and are
//! not remembered.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use liftcast_core::{AthleteState, ClockState, CurrentAthlete, PlatformState};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_platforms))
        .route("/platform/{platform}/status", get(status))
        .route("/platform/{platform}/lifting-order", get(lifting_order))
        .route("/platform/{platform}/athlete-clock", get(athlete_clock))
        .route("/platform/{platform}/break-clock", get(break_clock))
        .route("/platform/{platform}/current-athlete", get(current_athlete))
        .route("/platform/{platform}/leaders", get(leaders))
}

#[derive(Serialize)]
struct PlatformsResponse {
    platforms: Vec<String>,
}

async fn list_platforms(State(state): State<AppState>) -> Json<PlatformsResponse> {
    Json(PlatformsResponse {
        platforms: state.hub.platforms(),
    })
}

// Single values are wrapped in a one-element array; existing displays
// consume them that way.

async fn status(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Json<[PlatformState; 1]> {
    Json([state.hub.status(&platform)])
}

async fn lifting_order(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Json<Vec<AthleteState>> {
    Json(state.hub.lifting_order(&platform))
}

async fn athlete_clock(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Json<[ClockState; 1]> {
    Json([state.hub.athlete_clock(&platform)])
}

async fn break_clock(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Json<[ClockState; 1]> {
    Json([state.hub.break_clock(&platform)])
}

async fn current_athlete(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Json<[CurrentAthlete; 1]> {
    Json([state.hub.current_athlete(&platform)])
}

async fn leaders(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Json<Vec<AthleteState>> {
    Json(state.hub.leaders(&platform))
}
