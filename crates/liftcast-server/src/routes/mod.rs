pub mod health;
pub mod ingest;
pub mod platforms;
pub mod ws;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(ingest::routes())
        .merge(platforms::routes())
        .merge(ws::routes())
        .merge(health::routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
