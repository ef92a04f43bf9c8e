use crate::domain::outcome::{Observation, TrackingEvent};
use crate::learning::reconciler::{delay_minutes, final_status};
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Missing bounds fall back to the trailing learning window ending today.
    pub fn resolve(&self, window_days: i64) -> (NaiveDate, NaiveDate) {
        let to = self.to.unwrap_or_else(|| chrono::Utc::now().date_naive());
        let from = self
            .from
            .unwrap_or_else(|| to - chrono::Duration::days((window_days - 1).max(0)));
        (from, to)
    }
}

#[derive(Debug, Deserialize)]
pub struct EndOfDayRequest {
    pub shipment_id: String,
    pub cycle_date: NaiveDate,
    pub events: Vec<TrackingEvent>,
}

fn internal(e: anyhow::Error) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": e.to_string()})),
    )
        .into_response()
}

pub async fn reconcile_outcome(
    State(state): State<AppState>,
    Json(observation): Json<Observation>,
) -> impl IntoResponse {
    match state.dispatch_service.reconcile_outcome(&observation).await {
        Ok(result) if result.recorded => (StatusCode::CREATED, Json(result)).into_response(),
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => internal(e),
    }
}

pub async fn reconcile_end_of_day(
    State(state): State<AppState>,
    Json(req): Json<EndOfDayRequest>,
) -> impl IntoResponse {
    let status = final_status(&req.events);
    let delay = delay_minutes(&req.events);
    match state
        .dispatch_service
        .reconcile_shipment(&req.shipment_id, status, delay, req.cycle_date)
        .await
    {
        Ok(Some(result)) => (StatusCode::OK, Json(result)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "no decision recorded for shipment"})),
        )
            .into_response(),
        Err(e) => internal(e),
    }
}

pub async fn statistics(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> impl IntoResponse {
    let (from, to) = range.resolve(state.learning_window_days);
    match state.dispatch_service.outcome_statistics(from, to).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => internal(e),
    }
}

pub async fn insights(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> impl IntoResponse {
    let (from, to) = range.resolve(state.learning_window_days);
    match state.dispatch_service.learning_insights(from, to).await {
        Ok(lines) => (StatusCode::OK, Json(serde_json::json!({"insights": lines}))).into_response(),
        Err(e) => internal(e),
    }
}

pub async fn override_effectiveness(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> impl IntoResponse {
    let (from, to) = range.resolve(state.learning_window_days);
    match state.dispatch_service.override_effectiveness(from, to).await {
        Ok(eff) => (StatusCode::OK, Json(eff)).into_response(),
        Err(e) => internal(e),
    }
}

pub async fn performance(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> impl IntoResponse {
    let (from, to) = range.resolve(state.learning_window_days);
    match state.dispatch_service.performance_breakdown(from, to).await {
        Ok(breakdown) => (StatusCode::OK, Json(breakdown)).into_response(),
        Err(e) => internal(e),
    }
}

pub async fn recommendations(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> impl IntoResponse {
    let (from, to) = range.resolve(state.learning_window_days);
    match state.dispatch_service.learning_recommendations(from, to).await {
        Ok(recs) => (StatusCode::OK, Json(recs)).into_response(),
        Err(e) => internal(e),
    }
}
