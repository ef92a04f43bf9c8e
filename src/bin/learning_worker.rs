use anyhow::Result;
use dispatch_gate::config::AppConfig;
use dispatch_gate::service::dispatch_service::DispatchService;
use dispatch_gate::store::postgres::PgDecisionStore;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let pool = PgPoolOptions::new().max_connections(5).connect(&cfg.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    loop {
        // Reload each round so overrides and weights written by the API are seen.
        let service = DispatchService::load_with_refresh(
            Arc::new(PgDecisionStore::new(pool.clone())),
            Duration::from_secs(cfg.weights_refresh_secs),
        )
        .await?;

        let to = chrono::Utc::now().date_naive();
        let from = to - chrono::Duration::days(cfg.learning_window_days - 1);
        match service.learned_on(to).await {
            // One cycle per day, even across restarts or a second worker.
            Ok(true) => tracing::info!("weights already learned on {}; skipping", to),
            Ok(false) => match service.run_learning_for_range(from, to).await {
                Ok(Some(cycle)) => tracing::info!(
                    "learning cycle {}..{} version={} adjustments={:?}",
                    from,
                    to,
                    cycle.new_weights.update_count,
                    cycle.adjustments
                ),
                Ok(None) => tracing::info!("no outcomes between {} and {}", from, to),
                Err(e) => tracing::warn!("learning cycle failed: {e:#}"),
            },
            Err(e) => tracing::warn!("could not read weight history: {e:#}"),
        }

        tokio::time::sleep(Duration::from_secs(cfg.learning_interval_secs)).await;
    }
}
