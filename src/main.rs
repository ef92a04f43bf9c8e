use dispatch_gate::config::AppConfig;
use dispatch_gate::http::routes::router;
use dispatch_gate::service::dispatch_service::DispatchService;
use dispatch_gate::store::postgres::PgDecisionStore;
use dispatch_gate::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = Arc::new(PgDecisionStore::new(pool));
    let dispatch_service =
        DispatchService::load_with_refresh(store, Duration::from_secs(cfg.weights_refresh_secs)).await?;

    let state = AppState {
        dispatch_service,
        learning_window_days: cfg.learning_window_days,
    };
    let app = router(state, cfg.internal_api_key.clone());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
