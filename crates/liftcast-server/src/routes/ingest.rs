//! Controller-facing endpoints.
//!
//! The controller never inspects responses, so every request is
//! acknowledged with an empty 200 whatever happens to the payload. Failures
//! are logged instead.

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    routing::post,
    Form, Router,
};

use liftcast_hub::{DecisionPayload, IngestError, Published, TimerPayload, UpdatePayload};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/decision", post(decision))
        .route("/timer", post(timer))
        .route("/update", post(update))
}

fn acknowledge(event: &str, outcome: Result<Published, IngestError>) -> StatusCode {
    match outcome {
        Ok(published) => {
            tracing::debug!(
                event,
                status = published.status,
                lifting_order = published.lifting_order,
                "Event applied"
            );
        }
        Err(e) => tracing::error!(event, "Event rejected: {}", e),
    }
    StatusCode::OK
}

fn unreadable(event: &str, rejection: FormRejection) -> StatusCode {
    tracing::error!(event, "Unreadable form body: {}", rejection);
    StatusCode::OK
}

async fn decision(
    State(state): State<AppState>,
    form: Result<Form<DecisionPayload>, FormRejection>,
) -> StatusCode {
    match form {
        Ok(Form(payload)) => acknowledge("decision", state.hub.handle_decision(payload)),
        Err(rejection) => unreadable("decision", rejection),
    }
}

async fn timer(
    State(state): State<AppState>,
    form: Result<Form<TimerPayload>, FormRejection>,
) -> StatusCode {
    match form {
        Ok(Form(payload)) => acknowledge("timer", state.hub.handle_timer(payload)),
        Err(rejection) => unreadable("timer", rejection),
    }
}

async fn update(
    State(state): State<AppState>,
    form: Result<Form<UpdatePayload>, FormRejection>,
) -> StatusCode {
    match form {
        Ok(Form(payload)) => acknowledge("update", state.hub.handle_update(payload)),
        Err(rejection) => unreadable("update", rejection),
    }
}
