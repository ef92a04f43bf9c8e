use crate::domain::decision::{Decision, DecisionRecord};
use crate::domain::outcome::{DeliveryStatus, Observation, OutcomeRecord};
use crate::domain::overrides::{OverrideOutcome, OverrideRecord, UnlockOutcome, UnlockStatus};
use crate::domain::shipment::RiskFactors;
use crate::gate::actions::{explain_shipment, ShipmentExplanation};
use crate::gate::evaluator::evaluate;
use crate::learning::adapter::{adapt, LearningCycle};
use crate::learning::analytics::{
    decision_performance, learning_insights, learning_recommendations, outcome_statistics,
    override_effectiveness, risk_bucket_performance, top_mismatch_patterns, weight_evolution,
    BucketPerformance, DecisionPerformance, LearningRecommendations, MismatchPattern, OutcomeStatistics,
    OverrideEffectiveness, WeightEvolutionPoint,
};
use crate::learning::reconciler::reconcile;
use crate::overrides::ledger::{plan_override, OverrideLedger, OverridePlan};
use crate::overrides::stats::{override_stats, OverrideStats};
use crate::risk::engine::score_risk;
use crate::risk::types::{RiskAssessment, RiskCategory, WeightSet};
use crate::service::weights_store::WeightsStore;
use crate::store::DecisionStore;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const DEFAULT_WEIGHTS_TTL: Duration = Duration::from_secs(30);
const LEARNING_ATTEMPTS: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentDecision {
    /// A manager override is active; the gate was not consulted.
    Locked {
        shipment_id: String,
        decision: Decision,
        override_record: OverrideRecord,
    },
    Evaluated(DecisionRecord),
}

impl ShipmentDecision {
    pub fn decision(&self) -> Decision {
        match self {
            ShipmentDecision::Locked { decision, .. } => *decision,
            ShipmentDecision::Evaluated(record) => record.decision,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconcileResult {
    pub outcome: OutcomeRecord,
    /// False when the outcome log already held a record for this shipment and date.
    pub recorded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceBreakdown {
    pub risk_buckets: BTreeMap<RiskCategory, BucketPerformance>,
    pub decisions: BTreeMap<Decision, DecisionPerformance>,
    pub top_mismatches: Vec<MismatchPattern>,
}

/// Single writer over the override ledger and the outcome log. Weights are
/// shared with other processes through the store and re-read once the
/// cached copy is older than its ttl.
#[derive(Clone)]
pub struct DispatchService {
    pub store: Arc<dyn DecisionStore>,
    weights: WeightsStore,
    ledger: Arc<Mutex<OverrideLedger>>,
    learning_lock: Arc<Mutex<()>>,
}

impl DispatchService {
    pub async fn load(store: Arc<dyn DecisionStore>) -> Result<Self> {
        Self::load_with_refresh(store, DEFAULT_WEIGHTS_TTL).await
    }

    pub async fn load_with_refresh(store: Arc<dyn DecisionStore>, weights_ttl: Duration) -> Result<Self> {
        let weights = match store.load_weights().await? {
            Some(set) => set,
            None => {
                let set = store.init_weights(&WeightSet::with_defaults(chrono::Utc::now())).await?;
                tracing::info!(store = store.name(), "initialized default risk weights");
                set
            }
        };
        let ledger = OverrideLedger::from_records(store.load_overrides().await?);
        tracing::info!(
            store = store.name(),
            weights_version = weights.update_count,
            overrides = ledger.len(),
            "dispatch service loaded"
        );

        Ok(Self {
            store,
            weights: WeightsStore::new(weights, weights_ttl),
            ledger: Arc::new(Mutex::new(ledger)),
            learning_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Current weights, re-read from the store when the cached copy expired.
    pub async fn weights(&self) -> Result<Arc<WeightSet>> {
        if !self.weights.is_stale().await {
            return Ok(self.weights.snapshot().await);
        }
        self.reload_weights().await
    }

    async fn reload_weights(&self) -> Result<Arc<WeightSet>> {
        let held = self.weights.version().await;
        match self.store.load_weights().await? {
            Some(loaded) => {
                let current = self.weights.refresh(loaded).await;
                if current.update_count != held {
                    tracing::info!(from = held, to = current.update_count, "picked up newer risk weights");
                }
                Ok(current)
            }
            None => Ok(self.weights.snapshot().await),
        }
    }

    pub async fn score_risk(&self, factors: &RiskFactors) -> Result<RiskAssessment> {
        let weights = self.weights().await?;
        Ok(score_risk(factors, &*weights))
    }

    /// Honors an active manual lock; otherwise runs the gate and records the
    /// decision against the current weight version.
    pub async fn evaluate_shipment(
        &self,
        shipment_id: &str,
        risk_score: f64,
        weather_impact: f64,
        address_confidence: f64,
    ) -> Result<ShipmentDecision> {
        let version = self.weights().await?.update_count;
        // Held through the insert so an override cannot land between the
        // lock check and the recorded decision.
        let ledger = self.ledger.lock().await;
        if let Some(lock) = ledger.active_lock(shipment_id).cloned() {
            tracing::debug!(shipment_id, decision = %lock.override_decision, "shipment locked by override");
            return Ok(ShipmentDecision::Locked {
                shipment_id: shipment_id.to_string(),
                decision: lock.override_decision,
                override_record: lock,
            });
        }

        let record = evaluate(shipment_id, risk_score, weather_impact, address_confidence);
        self.store.insert_decision(&record, version).await?;
        drop(ledger);
        Ok(ShipmentDecision::Evaluated(record))
    }

    /// Scores the shipment with the current weights, then evaluates it.
    pub async fn assess_shipment(
        &self,
        factors: &RiskFactors,
    ) -> Result<(RiskAssessment, ShipmentDecision)> {
        let assessment = self.score_risk(factors).await?;
        let decision = self
            .evaluate_shipment(
                &factors.shipment_id,
                assessment.score as f64,
                factors.weather_impact,
                factors.address_confidence,
            )
            .await?;
        Ok((assessment, decision))
    }

    pub async fn apply_override(
        &self,
        shipment_id: &str,
        ai_decision: &str,
        override_decision: &str,
        reason: &str,
    ) -> Result<OverrideOutcome> {
        let mut ledger = self.ledger.lock().await;
        match plan_override(shipment_id, ai_decision, override_decision, reason, chrono::Utc::now()) {
            OverridePlan::Rejected(outcome) => {
                tracing::warn!(shipment_id, message = %outcome.message, "override rejected");
                Ok(outcome)
            }
            OverridePlan::Agreed(outcome) => Ok(outcome),
            OverridePlan::Append(record) => {
                self.store.append_override(&record).await?;
                tracing::info!(
                    shipment_id,
                    from = %record.ai_decision,
                    to = %record.override_decision,
                    reason = %record.override_reason,
                    "override applied"
                );
                Ok(ledger.append(record))
            }
        }
    }

    pub async fn is_locked(&self, shipment_id: &str) -> bool {
        self.ledger.lock().await.is_locked(shipment_id)
    }

    /// What the shipment should do right now: the active lock when there is
    /// one, else the latest recorded gate decision.
    pub async fn explain_shipment(&self, shipment_id: &str) -> Result<Option<ShipmentExplanation>> {
        let record = self.store.latest_decision(shipment_id).await?;
        let lock = self.ledger.lock().await.active_lock(shipment_id).cloned();
        Ok(explain_shipment(shipment_id, record, lock))
    }

    pub async fn unlock(&self, shipment_id: &str) -> Result<UnlockOutcome> {
        let mut ledger = self.ledger.lock().await;
        if !ledger.has_active(shipment_id) {
            return Ok(ledger.unlock(shipment_id, chrono::Utc::now()));
        }

        let now = chrono::Utc::now();
        let persisted = self.store.supersede_overrides(shipment_id, now).await?;
        let outcome = ledger.unlock(shipment_id, now);
        if outcome.status == UnlockStatus::Unlocked {
            tracing::info!(shipment_id, released = outcome.released_records, persisted, "shipment unlocked");
        }
        Ok(outcome)
    }

    pub async fn override_stats(&self) -> OverrideStats {
        let ledger = self.ledger.lock().await;
        override_stats(ledger.active_records())
    }

    pub async fn override_history(&self, shipment_id: Option<&str>) -> Vec<OverrideRecord> {
        let ledger = self.ledger.lock().await;
        ledger.history(shipment_id).into_iter().cloned().collect()
    }

    pub async fn reconcile_outcome(&self, observation: &Observation) -> Result<ReconcileResult> {
        let outcome = reconcile(observation);
        let recorded = self.store.insert_outcome(&outcome).await?;
        if !recorded {
            tracing::warn!(
                shipment_id = %outcome.shipment_id,
                cycle_date = %outcome.cycle_date,
                "outcome already recorded for this cycle; keeping the first"
            );
        }
        Ok(ReconcileResult { outcome, recorded })
    }

    /// End-of-day reconciliation from stored state. Returns `None` when no
    /// decision was ever recorded for the shipment.
    pub async fn reconcile_shipment(
        &self,
        shipment_id: &str,
        actual_status: DeliveryStatus,
        delay_minutes: i32,
        cycle_date: chrono::NaiveDate,
    ) -> Result<Option<ReconcileResult>> {
        let Some(decision) = self.store.latest_decision(shipment_id).await? else {
            tracing::debug!(shipment_id, "no recorded decision; skipping reconciliation");
            return Ok(None);
        };
        let override_flag = self.ledger.lock().await.latest_for(shipment_id).is_some();

        let observation = Observation {
            shipment_id: shipment_id.to_string(),
            cycle_date,
            predicted_decision: decision.decision,
            predicted_risk_score: decision.risk_score,
            actual_status,
            delay_minutes,
            override_flag,
        };
        self.reconcile_outcome(&observation).await.map(Some)
    }

    /// Runs one bounded adaptation over `window` and publishes the result.
    /// Cycles in this process are serialized. The stored version is re-read
    /// before each attempt; when another writer moves it between read and
    /// swap, the cycle is recomputed on the newer weights once more.
    pub async fn run_learning_cycle(&self, window: &[OutcomeRecord]) -> Result<Option<LearningCycle>> {
        let _guard = self.learning_lock.lock().await;

        for attempt in 1..=LEARNING_ATTEMPTS {
            let current = self.reload_weights().await?;
            let Some(cycle) = adapt(&current, window, chrono::Utc::now()) else {
                tracing::info!("learning cycle skipped: empty outcome window");
                return Ok(None);
            };

            let expected = current.update_count;
            if !self.store.swap_weights(expected, &cycle.new_weights).await? {
                tracing::warn!(expected_version = expected, attempt, "weight set changed underneath learning cycle");
                continue;
            }
            self.weights.refresh(cycle.new_weights.clone()).await;

            tracing::info!(
                window = window.len(),
                high_risk_failures = cycle.signals.high_risk_failures,
                low_risk_successes = cycle.signals.low_risk_successes,
                missed_risks = cycle.signals.missed_risks,
                version = cycle.new_weights.update_count,
                "learning cycle applied"
            );
            return Ok(Some(cycle));
        }

        Err(anyhow!(
            "weight set kept moving; learning cycle gave up after {LEARNING_ATTEMPTS} attempts"
        ))
    }

    /// True when the stored weights already carry a cycle applied on `day`.
    pub async fn learned_on(&self, day: chrono::NaiveDate) -> Result<bool> {
        let current = self.reload_weights().await?;
        Ok(current.last_cycle_date() == Some(day))
    }

    pub async fn run_learning_for_range(
        &self,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> Result<Option<LearningCycle>> {
        let window = self.store.outcomes_between(from, to).await?;
        self.run_learning_cycle(&window).await
    }

    pub async fn outcome_statistics(
        &self,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> Result<OutcomeStatistics> {
        Ok(outcome_statistics(&self.store.outcomes_between(from, to).await?))
    }

    pub async fn learning_insights(&self, from: chrono::NaiveDate, to: chrono::NaiveDate) -> Result<Vec<String>> {
        Ok(learning_insights(&self.store.outcomes_between(from, to).await?))
    }

    pub async fn override_effectiveness(
        &self,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> Result<OverrideEffectiveness> {
        Ok(override_effectiveness(&self.store.outcomes_between(from, to).await?))
    }

    pub async fn performance_breakdown(
        &self,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> Result<PerformanceBreakdown> {
        let window = self.store.outcomes_between(from, to).await?;
        Ok(PerformanceBreakdown {
            risk_buckets: risk_bucket_performance(&window),
            decisions: decision_performance(&window),
            top_mismatches: top_mismatch_patterns(&window),
        })
    }

    pub async fn learning_recommendations(
        &self,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> Result<LearningRecommendations> {
        Ok(learning_recommendations(&self.store.outcomes_between(from, to).await?))
    }

    pub async fn weight_evolution(&self) -> Result<Vec<WeightEvolutionPoint>> {
        let weights = self.weights().await?;
        Ok(weight_evolution(&*weights))
    }
}
