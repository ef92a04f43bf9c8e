use crate::domain::overrides::{OverrideReason, OverrideStatus, UnlockStatus};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    pub shipment_id: String,
    pub ai_decision: String,
    pub override_decision: String,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub shipment_id: Option<String>,
}

pub async fn apply_override(
    State(state): State<AppState>,
    Json(req): Json<OverrideRequest>,
) -> impl IntoResponse {
    match state
        .dispatch_service
        .apply_override(&req.shipment_id, &req.ai_decision, &req.override_decision, &req.reason)
        .await
    {
        Ok(outcome) => {
            let status = match outcome.status {
                OverrideStatus::Error => StatusCode::BAD_REQUEST,
                OverrideStatus::Overridden => StatusCode::CREATED,
                OverrideStatus::NoOverride => StatusCode::OK,
            };
            (status, Json(outcome)).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

pub async fn lock_status(
    State(state): State<AppState>,
    Path(shipment_id): Path<String>,
) -> impl IntoResponse {
    let locked = state.dispatch_service.is_locked(&shipment_id).await;
    (
        StatusCode::OK,
        Json(serde_json::json!({"shipment_id": shipment_id, "locked": locked})),
    )
        .into_response()
}

pub async fn unlock(
    State(state): State<AppState>,
    Path(shipment_id): Path<String>,
) -> impl IntoResponse {
    match state.dispatch_service.unlock(&shipment_id).await {
        Ok(outcome) if outcome.status == UnlockStatus::NotFound => {
            (StatusCode::NOT_FOUND, Json(outcome)).into_response()
        }
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.dispatch_service.override_stats().await)).into_response()
}

pub async fn history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> impl IntoResponse {
    let rows = state
        .dispatch_service
        .override_history(q.shipment_id.as_deref())
        .await;
    (StatusCode::OK, Json(rows)).into_response()
}

pub async fn reasons() -> impl IntoResponse {
    (StatusCode::OK, Json(OverrideReason::CATALOG)).into_response()
}
