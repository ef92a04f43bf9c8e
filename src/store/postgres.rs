use super::DecisionStore;
use crate::domain::decision::DecisionRecord;
use crate::domain::outcome::OutcomeRecord;
use crate::domain::overrides::OverrideRecord;
use crate::repo::decisions_repo::DecisionsRepo;
use crate::repo::outcome_log_repo::OutcomeLogRepo;
use crate::repo::override_ledger_repo::OverrideLedgerRepo;
use crate::repo::weights_repo::WeightsRepo;
use crate::risk::types::WeightSet;
use anyhow::Result;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgDecisionStore {
    pub pool: PgPool,
    pub weights_repo: WeightsRepo,
    pub override_ledger_repo: OverrideLedgerRepo,
    pub outcome_log_repo: OutcomeLogRepo,
    pub decisions_repo: DecisionsRepo,
}

impl PgDecisionStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            weights_repo: WeightsRepo { pool: pool.clone() },
            override_ledger_repo: OverrideLedgerRepo { pool: pool.clone() },
            outcome_log_repo: OutcomeLogRepo { pool: pool.clone() },
            decisions_repo: DecisionsRepo { pool: pool.clone() },
            pool,
        }
    }
}

#[async_trait::async_trait]
impl DecisionStore for PgDecisionStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn load_weights(&self) -> Result<Option<WeightSet>> {
        self.weights_repo.load().await
    }

    async fn init_weights(&self, initial: &WeightSet) -> Result<WeightSet> {
        self.weights_repo.insert_if_absent(initial).await
    }

    async fn swap_weights(&self, expected_version: i64, next: &WeightSet) -> Result<bool> {
        self.weights_repo.swap(expected_version, next).await
    }

    async fn append_override(&self, record: &OverrideRecord) -> Result<()> {
        self.override_ledger_repo.append(record).await
    }

    async fn supersede_overrides(
        &self,
        shipment_id: &str,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64> {
        self.override_ledger_repo.supersede(shipment_id, at).await
    }

    async fn load_overrides(&self) -> Result<Vec<OverrideRecord>> {
        self.override_ledger_repo.list_all().await
    }

    async fn insert_decision(&self, record: &DecisionRecord, weights_version: i64) -> Result<()> {
        self.decisions_repo.insert(record, weights_version).await
    }

    async fn latest_decision(&self, shipment_id: &str) -> Result<Option<DecisionRecord>> {
        self.decisions_repo.latest_for(shipment_id).await
    }

    async fn insert_outcome(&self, record: &OutcomeRecord) -> Result<bool> {
        self.outcome_log_repo.insert(record).await
    }

    async fn outcomes_between(
        &self,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> Result<Vec<OutcomeRecord>> {
        self.outcome_log_repo.between(from, to).await
    }
}
