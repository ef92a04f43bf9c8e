use crate::domain::decision::DecisionRecord;
use crate::domain::outcome::OutcomeRecord;
use crate::domain::overrides::OverrideRecord;
use crate::risk::types::WeightSet;
use anyhow::Result;

pub mod memory;
pub mod postgres;

/// Durable state behind the dispatch service. Every write is either an
/// append or a version-checked swap.
#[async_trait::async_trait]
pub trait DecisionStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn ping(&self) -> Result<()>;

    async fn load_weights(&self) -> Result<Option<WeightSet>>;

    /// Stores `initial` only when no weight set exists yet and returns the
    /// set that is current afterwards.
    async fn init_weights(&self, initial: &WeightSet) -> Result<WeightSet>;

    /// Replaces the weight set only if its stored `update_count` still equals
    /// `expected_version`.
    async fn swap_weights(&self, expected_version: i64, next: &WeightSet) -> Result<bool>;

    async fn append_override(&self, record: &OverrideRecord) -> Result<()>;

    async fn supersede_overrides(
        &self,
        shipment_id: &str,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64>;

    async fn load_overrides(&self) -> Result<Vec<OverrideRecord>>;

    async fn insert_decision(&self, record: &DecisionRecord, weights_version: i64) -> Result<()>;

    async fn latest_decision(&self, shipment_id: &str) -> Result<Option<DecisionRecord>>;

    /// Returns false when an outcome already exists for the shipment and date.
    async fn insert_outcome(&self, record: &OutcomeRecord) -> Result<bool>;

    async fn outcomes_between(
        &self,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> Result<Vec<OutcomeRecord>>;
}
