//! API routes for memod
//!
//! Every response from `/api/organize` is HTTP 200. Failures travel in-band through
//! `raw_response`.

use crate::state::AppStateArc;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use memo_common::{
    validate_commands, HealthResponse, OrganizeOutcome, OrganizeRequest, OrganizeResponse,
};
use std::time::Instant;
use tracing::{error, info, warn};

// ============================================================================
// Organize Routes
// ============================================================================

pub fn organize_routes() -> Router<AppStateArc> {
    Router::new().route("/api/organize", post(organize))
}

async fn organize(
    State(state): State<AppStateArc>,
    Json(req): Json<OrganizeRequest>,
) -> Json<OrganizeResponse> {
    let start = Instant::now();
    info!("Received organize request: {}", req.text);

    let Some(organizer) = state.organizer.as_ref() else {
        error!("Organizer is not available");
        return Json(OrganizeResponse::unavailable());
    };

    let outcome = organizer.organize(&req.text, &req.current_themes).await;

    let (commands, raw_response) = match outcome {
        OrganizeOutcome::Failed { error, .. } => {
            error!("Service error: {}", error);
            let elapsed = start.elapsed().as_secs_f64();
            return Json(OrganizeResponse::error(&error, elapsed));
        }
        OrganizeOutcome::Parsed {
            commands,
            raw_response,
        } => (commands, raw_response),
    };

    let report = validate_commands(commands);
    for dropped in &report.dropped {
        warn!(
            "Skipping invalid command #{}: {} - {}",
            dropped.index, dropped.raw, dropped.reason
        );
    }
    info!(
        "Organized into {} command(s), {} dropped",
        report.kept.len(),
        report.dropped.len()
    );

    Json(OrganizeResponse {
        commands: report.kept,
        raw_response: Some(raw_response),
        processing_time: Some(start.elapsed().as_secs_f64()),
    })
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse::new(state.service_ready()))
}
