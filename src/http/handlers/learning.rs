use crate::http::handlers::outcomes::DateRange;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

pub async fn run_cycle(
    State(state): State<AppState>,
    Json(range): Json<DateRange>,
) -> impl IntoResponse {
    let (from, to) = range.resolve(state.learning_window_days);
    match state.dispatch_service.run_learning_for_range(from, to).await {
        Ok(Some(cycle)) => (StatusCode::OK, Json(cycle)).into_response(),
        Ok(None) => (
            StatusCode::OK,
            Json(serde_json::json!({"skipped": true, "reason": "no outcomes in window"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

fn internal(e: anyhow::Error) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": e.to_string()})),
    )
        .into_response()
}

pub async fn current_weights(State(state): State<AppState>) -> impl IntoResponse {
    match state.dispatch_service.weights().await {
        Ok(weights) => (StatusCode::OK, Json((*weights).clone())).into_response(),
        Err(e) => internal(e),
    }
}

pub async fn weight_evolution(State(state): State<AppState>) -> impl IntoResponse {
    match state.dispatch_service.weight_evolution().await {
        Ok(points) => (StatusCode::OK, Json(points)).into_response(),
        Err(e) => internal(e),
    }
}
