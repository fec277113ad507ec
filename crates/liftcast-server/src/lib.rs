//! Liftcast Server - HTTP ingestion and WebSocket fan-out for platform displays.

pub mod config;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::create_router;
pub use state::AppState;
