use crate::http::handlers::{decisions, learning, ops, outcomes, overrides};
use crate::http::middleware::admin_auth::require_internal_api_key;
use crate::AppState;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

/// Full HTTP surface. Routes that mutate the ledgers or weights sit behind
/// the internal api key.
pub fn router(state: AppState, internal_api_key: String) -> Router {
    let admin_routes = Router::new()
        .route("/overrides", post(overrides::apply_override))
        .route("/overrides/:shipment_id/unlock", post(overrides::unlock))
        .route("/outcomes", post(outcomes::reconcile_outcome))
        .route("/outcomes/end-of-day", post(outcomes::reconcile_end_of_day))
        .route("/learning/run", post(learning::run_cycle))
        .layer(from_fn_with_state(internal_api_key, require_internal_api_key));

    Router::new()
        .route("/risk/score", post(decisions::score_risk))
        .route("/gate/preview", post(decisions::gate_preview))
        .route("/decisions", post(decisions::evaluate_shipment))
        .route("/shipments/assess", post(decisions::assess_shipment))
        .route("/decisions/:shipment_id/explain", get(decisions::explain_decision))
        .route("/overrides/reasons", get(overrides::reasons))
        .route("/overrides/stats", get(overrides::stats))
        .route("/overrides/history", get(overrides::history))
        .route("/overrides/:shipment_id/lock", get(overrides::lock_status))
        .route("/outcomes/statistics", get(outcomes::statistics))
        .route("/outcomes/insights", get(outcomes::insights))
        .route("/outcomes/override-effectiveness", get(outcomes::override_effectiveness))
        .route("/outcomes/performance", get(outcomes::performance))
        .route("/outcomes/recommendations", get(outcomes::recommendations))
        .route("/learning/weights", get(learning::current_weights))
        .route("/learning/evolution", get(learning::weight_evolution))
        .route("/ops/readiness", get(ops::readiness))
        .route("/ops/liveness", get(ops::liveness))
        .merge(admin_routes)
        .with_state(state)
}
