use super::DecisionStore;
use crate::domain::decision::DecisionRecord;
use crate::domain::outcome::OutcomeRecord;
use crate::domain::overrides::OverrideRecord;
use crate::risk::types::WeightSet;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct MemoryState {
    weights: Option<WeightSet>,
    overrides: Vec<OverrideRecord>,
    decisions: HashMap<String, DecisionRecord>,
    outcomes: Vec<OutcomeRecord>,
}

/// Process-local store for tests and local runs.
#[derive(Clone, Default)]
pub struct MemoryDecisionStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryDecisionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DecisionStore for MemoryDecisionStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn load_weights(&self) -> Result<Option<WeightSet>> {
        Ok(self.inner.lock().await.weights.clone())
    }

    async fn init_weights(&self, initial: &WeightSet) -> Result<WeightSet> {
        let mut state = self.inner.lock().await;
        Ok(state.weights.get_or_insert_with(|| initial.clone()).clone())
    }

    async fn swap_weights(&self, expected_version: i64, next: &WeightSet) -> Result<bool> {
        let mut state = self.inner.lock().await;
        match &state.weights {
            Some(current) if current.update_count == expected_version => {
                state.weights = Some(next.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn append_override(&self, record: &OverrideRecord) -> Result<()> {
        self.inner.lock().await.overrides.push(record.clone());
        Ok(())
    }

    async fn supersede_overrides(
        &self,
        shipment_id: &str,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64> {
        let mut state = self.inner.lock().await;
        let mut released = 0;
        for record in state
            .overrides
            .iter_mut()
            .filter(|r| r.shipment_id == shipment_id && r.is_active())
        {
            record.superseded_at = Some(at);
            released += 1;
        }
        Ok(released)
    }

    async fn load_overrides(&self) -> Result<Vec<OverrideRecord>> {
        Ok(self.inner.lock().await.overrides.clone())
    }

    async fn insert_decision(&self, record: &DecisionRecord, _weights_version: i64) -> Result<()> {
        self.inner
            .lock()
            .await
            .decisions
            .insert(record.shipment_id.clone(), record.clone());
        Ok(())
    }

    async fn latest_decision(&self, shipment_id: &str) -> Result<Option<DecisionRecord>> {
        Ok(self.inner.lock().await.decisions.get(shipment_id).cloned())
    }

    async fn insert_outcome(&self, record: &OutcomeRecord) -> Result<bool> {
        let mut state = self.inner.lock().await;
        let duplicate = state
            .outcomes
            .iter()
            .any(|o| o.shipment_id == record.shipment_id && o.cycle_date == record.cycle_date);
        if duplicate {
            return Ok(false);
        }
        state.outcomes.push(record.clone());
        Ok(true)
    }

    async fn outcomes_between(
        &self,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> Result<Vec<OutcomeRecord>> {
        Ok(self
            .inner
            .lock()
            .await
            .outcomes
            .iter()
            .filter(|o| o.cycle_date >= from && o.cycle_date <= to)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn swap_rejects_stale_version() {
        let store = MemoryDecisionStore::new();
        let now = chrono::Utc::now();
        let initial = store.init_weights(&WeightSet::with_defaults(now)).await.unwrap();
        assert_eq!(initial.update_count, 0);

        let mut next = initial.clone();
        next.update_count = 1;
        assert!(store.swap_weights(0, &next).await.unwrap());
        assert!(!store.swap_weights(0, &next).await.unwrap());

        let again = store.init_weights(&WeightSet::with_defaults(now)).await.unwrap();
        assert_eq!(again.update_count, 1);
    }
}
