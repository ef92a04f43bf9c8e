use crate::domain::decision::Decision;
use crate::domain::outcome::OutcomeRecord;
use crate::risk::types::{AdjustmentRecord, FactorValues, LearningSignals, RiskFactor, WeightSet};
use serde::{Deserialize, Serialize};

pub const MAX_WEIGHT_CHANGE: i32 = 5;
pub const HIGH_RISK_SCORE: f64 = 60.0;
pub const LOW_RISK_SCORE: f64 = 30.0;
/// Low-risk successes must exceed this before weight-risk is relaxed.
pub const MIN_LOW_RISK_EVIDENCE: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LearningCycle {
    pub signals: LearningSignals,
    pub original_weights: FactorValues,
    pub adjustments: FactorValues,
    pub new_weights: WeightSet,
}

fn capped(count: usize) -> i32 {
    count.min(MAX_WEIGHT_CHANGE as usize) as i32
}

pub fn learning_signals(window: &[OutcomeRecord]) -> LearningSignals {
    let high_risk_failures = window
        .iter()
        .filter(|o| o.predicted_risk_score > HIGH_RISK_SCORE && !o.was_successful())
        .count();
    let low_risk_successes = window
        .iter()
        .filter(|o| o.predicted_risk_score < LOW_RISK_SCORE && o.was_successful())
        .count();
    let missed_risks = window
        .iter()
        .filter(|o| o.mismatch_flag && o.predicted_decision == Decision::Dispatch && !o.was_successful())
        .count();

    LearningSignals {
        high_risk_failures,
        low_risk_successes,
        missed_risks,
    }
}

pub fn adjustments_for(signals: &LearningSignals) -> FactorValues {
    let mut adj = FactorValues::default();

    if signals.high_risk_failures > 0 {
        let step = capped(signals.high_risk_failures);
        adj.address_risk += step;
        adj.weather_risk += step;
    }

    if signals.low_risk_successes > MIN_LOW_RISK_EVIDENCE {
        adj.weight_risk -= capped(signals.low_risk_successes / 5);
    }

    if signals.missed_risks > 0 {
        let step = capped(signals.missed_risks);
        adj.cod_risk += step;
        adj.area_risk += step;
    }

    adj
}

/// One bounded nudge over the window. Returns `None` for an empty window;
/// otherwise the caller gets a fresh weight set with the version bumped and
/// one more history entry. `current` is never modified.
pub fn adapt(
    current: &WeightSet,
    window: &[OutcomeRecord],
    now: chrono::DateTime<chrono::Utc>,
) -> Option<LearningCycle> {
    if window.is_empty() {
        return None;
    }

    let signals = learning_signals(window);
    let adjustments = adjustments_for(&signals);

    let mut next = current.clone();
    for factor in RiskFactor::ALL {
        *next.weights.slot(factor) += adjustments.get(factor);
    }
    next.weights = next.weights.clamped();
    next.last_updated = now;
    next.update_count += 1;
    next.push_history(AdjustmentRecord {
        timestamp: now,
        signals,
        adjustments,
        new_weights: next.weights,
    });

    Some(LearningCycle {
        signals,
        original_weights: current.weights,
        adjustments,
        new_weights: next,
    })
}
