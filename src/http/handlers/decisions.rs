use crate::domain::shipment::RiskFactors;
use crate::gate::evaluator::decide_dispatch;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GateInput {
    pub shipment_id: String,
    pub risk_score: f64,
    pub weather_impact: f64,
    pub address_confidence: f64,
}

fn internal(e: anyhow::Error) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": e.to_string()})),
    )
        .into_response()
}

pub async fn score_risk(
    State(state): State<AppState>,
    Json(factors): Json<RiskFactors>,
) -> impl IntoResponse {
    match state.dispatch_service.score_risk(&factors).await {
        Ok(assessment) => (StatusCode::OK, Json(assessment)).into_response(),
        Err(e) => internal(e),
    }
}

/// Stateless gate check; nothing is recorded.
pub async fn gate_preview(Json(input): Json<GateInput>) -> impl IntoResponse {
    let verdict = decide_dispatch(input.risk_score, input.weather_impact, input.address_confidence);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "shipment_id": input.shipment_id,
            "decision": verdict.decision,
            "reasons": verdict.reasons,
        })),
    )
        .into_response()
}

pub async fn evaluate_shipment(
    State(state): State<AppState>,
    Json(input): Json<GateInput>,
) -> impl IntoResponse {
    match state
        .dispatch_service
        .evaluate_shipment(
            &input.shipment_id,
            input.risk_score,
            input.weather_impact,
            input.address_confidence,
        )
        .await
    {
        Ok(decision) => (StatusCode::OK, Json(decision)).into_response(),
        Err(e) => internal(e),
    }
}

pub async fn assess_shipment(
    State(state): State<AppState>,
    Json(factors): Json<RiskFactors>,
) -> impl IntoResponse {
    match state.dispatch_service.assess_shipment(&factors).await {
        Ok((assessment, decision)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "assessment": assessment,
                "decision": decision,
            })),
        )
            .into_response(),
        Err(e) => internal(e),
    }
}

/// Reflects an active manual lock ahead of the recorded gate decision.
pub async fn explain_decision(
    State(state): State<AppState>,
    Path(shipment_id): Path<String>,
) -> impl IntoResponse {
    match state.dispatch_service.explain_shipment(&shipment_id).await {
        Ok(Some(explanation)) => (StatusCode::OK, Json(explanation)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "no decision recorded for shipment"})),
        )
            .into_response(),
        Err(e) => internal(e),
    }
}
