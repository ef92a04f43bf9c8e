use crate::domain::decision::Decision;
use crate::domain::outcome::{DeliveryStatus, OutcomeRecord};
use crate::risk::engine::risk_category;
use crate::risk::types::{FactorValues, LearningSignals, RiskCategory, WeightSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OutcomeStatistics {
    pub total_shipments: usize,
    pub successful_deliveries: usize,
    pub success_rate: f64,
    pub total_delays: usize,
    pub avg_delay_minutes: f64,
    pub total_overrides: usize,
    pub override_rate: f64,
    pub total_mismatches: usize,
    pub mismatch_rate: f64,
    pub avg_prediction_accuracy: f64,
    pub cautious_predictions: usize,
    pub decision_distribution: BTreeMap<Decision, usize>,
    pub status_distribution: BTreeMap<DeliveryStatus, usize>,
}

fn ratio(a: usize, b: usize) -> f64 {
    if b == 0 {
        0.0
    } else {
        a as f64 / b as f64
    }
}

pub fn outcome_statistics(window: &[OutcomeRecord]) -> OutcomeStatistics {
    let total = window.len();
    if total == 0 {
        return OutcomeStatistics::default();
    }

    let successful = window.iter().filter(|o| o.was_successful()).count();
    let delays = window.iter().filter(|o| o.had_delay()).count();
    let overrides = window.iter().filter(|o| o.override_flag).count();
    let mismatches = window.iter().filter(|o| o.mismatch_flag).count();
    let cautious = window.iter().filter(|o| o.model_was_cautious()).count();
    let delay_sum: i64 = window.iter().map(|o| o.delay_minutes as i64).sum();
    let accuracy_sum: f64 = window.iter().map(|o| o.prediction_accuracy).sum();

    let mut decision_distribution = BTreeMap::new();
    let mut status_distribution = BTreeMap::new();
    for o in window {
        *decision_distribution.entry(o.predicted_decision).or_insert(0) += 1;
        *status_distribution.entry(o.actual_status).or_insert(0) += 1;
    }

    OutcomeStatistics {
        total_shipments: total,
        successful_deliveries: successful,
        success_rate: ratio(successful, total),
        total_delays: delays,
        avg_delay_minutes: delay_sum as f64 / total as f64,
        total_overrides: overrides,
        override_rate: ratio(overrides, total),
        total_mismatches: mismatches,
        mismatch_rate: ratio(mismatches, total),
        avg_prediction_accuracy: accuracy_sum / total as f64,
        cautious_predictions: cautious,
        decision_distribution,
        status_distribution,
    }
}

pub fn learning_insights(window: &[OutcomeRecord]) -> Vec<String> {
    if window.is_empty() {
        return vec!["no outcome data available yet".to_string()];
    }

    let stats = outcome_statistics(window);
    let total = stats.total_shipments;
    let mut insights = Vec::new();

    if stats.mismatch_rate > 0.20 {
        insights.push(format!(
            "high mismatch rate ({:.1}%): risk model needs recalibration",
            stats.mismatch_rate * 100.0
        ));
    }

    if stats.override_rate > 0.10 {
        insights.push(format!(
            "high override rate ({:.1}%): model may be too conservative or missing local context",
            stats.override_rate * 100.0
        ));
    }

    let dispatched = window
        .iter()
        .filter(|o| o.predicted_decision == Decision::Dispatch)
        .count();
    let dispatched_delayed = window
        .iter()
        .filter(|o| o.predicted_decision == Decision::Dispatch && o.had_delay())
        .count();
    if dispatched_delayed > 0 {
        insights.push(format!(
            "{:.1}% of DISPATCH decisions ran late: consider stricter thresholds",
            ratio(dispatched_delayed, dispatched) * 100.0
        ));
    }

    let cautious_success = window
        .iter()
        .filter(|o| o.model_was_cautious() && o.was_successful())
        .count();
    if cautious_success as f64 > total as f64 * 0.3 {
        insights.push("model is overly cautious: many DELAY/RESCHEDULE shipments delivered fine".to_string());
    }

    let failed = window
        .iter()
        .filter(|o| o.actual_status == DeliveryStatus::FailedAttempt)
        .count();
    if ratio(failed, total) > 0.05 {
        insights.push(format!(
            "failed delivery rate {:.1}%: address intelligence needs improvement",
            ratio(failed, total) * 100.0
        ));
    }

    if insights.is_empty() {
        insights.push("system performing well: low mismatch rate, good prediction accuracy".to_string());
    }
    insights
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideVerdict {
    NoOverrides,
    HumansAhead,
    ModelAhead,
    Balanced,
    InsufficientModelData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverrideEffectiveness {
    pub total_overrides: usize,
    pub successful_overrides: usize,
    pub override_success_rate: Option<f64>,
    pub model_success_rate: Option<f64>,
    pub performance_gap: Option<f64>,
    pub verdict: OverrideVerdict,
}

pub fn override_effectiveness(window: &[OutcomeRecord]) -> OverrideEffectiveness {
    let (overridden, model_only): (Vec<&OutcomeRecord>, Vec<&OutcomeRecord>) =
        window.iter().partition(|o| o.override_flag);

    if overridden.is_empty() {
        return OverrideEffectiveness {
            total_overrides: 0,
            successful_overrides: 0,
            override_success_rate: None,
            model_success_rate: None,
            performance_gap: None,
            verdict: OverrideVerdict::NoOverrides,
        };
    }

    let successful = overridden.iter().filter(|o| o.was_successful()).count();
    let override_rate = ratio(successful, overridden.len());

    let model_rate = (!model_only.is_empty())
        .then(|| ratio(model_only.iter().filter(|o| o.was_successful()).count(), model_only.len()));
    let gap = model_rate.map(|m| override_rate - m);

    let verdict = match gap {
        None => OverrideVerdict::InsufficientModelData,
        Some(g) if g > 0.1 => OverrideVerdict::HumansAhead,
        Some(g) if g < -0.1 => OverrideVerdict::ModelAhead,
        Some(_) => OverrideVerdict::Balanced,
    };

    OverrideEffectiveness {
        total_overrides: overridden.len(),
        successful_overrides: successful,
        override_success_rate: Some(override_rate),
        model_success_rate: model_rate,
        performance_gap: gap,
        verdict,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightEvolutionPoint {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub weights: FactorValues,
    pub signals: LearningSignals,
}

pub fn weight_evolution(set: &WeightSet) -> Vec<WeightEvolutionPoint> {
    set.adjustment_history
        .iter()
        .map(|r| WeightEvolutionPoint {
            timestamp: r.timestamp,
            weights: r.new_weights,
            signals: r.signals,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BucketPerformance {
    pub shipments: usize,
    pub success_rate: f64,
    pub avg_prediction_accuracy: f64,
}

/// Groups by the risk band the score fell in when the decision was made.
pub fn risk_bucket_performance(window: &[OutcomeRecord]) -> BTreeMap<RiskCategory, BucketPerformance> {
    let mut sums: BTreeMap<RiskCategory, (usize, usize, f64)> = BTreeMap::new();
    for o in window {
        let bucket = risk_category(o.predicted_risk_score as i32);
        let entry = sums.entry(bucket).or_insert((0, 0, 0.0));
        entry.0 += 1;
        entry.1 += o.was_successful() as usize;
        entry.2 += o.prediction_accuracy;
    }
    sums.into_iter()
        .map(|(bucket, (n, ok, acc))| {
            (
                bucket,
                BucketPerformance {
                    shipments: n,
                    success_rate: ratio(ok, n),
                    avg_prediction_accuracy: acc / n as f64,
                },
            )
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DecisionPerformance {
    pub shipments: usize,
    pub success_rate: f64,
    pub delay_rate: f64,
}

pub fn decision_performance(window: &[OutcomeRecord]) -> BTreeMap<Decision, DecisionPerformance> {
    let mut out: BTreeMap<Decision, (usize, usize, usize)> = BTreeMap::new();
    for o in window {
        let entry = out.entry(o.predicted_decision).or_insert((0, 0, 0));
        entry.0 += 1;
        entry.1 += o.was_successful() as usize;
        entry.2 += o.had_delay() as usize;
    }
    out.into_iter()
        .map(|(decision, (n, ok, late))| {
            (
                decision,
                DecisionPerformance {
                    shipments: n,
                    success_rate: ratio(ok, n),
                    delay_rate: ratio(late, n),
                },
            )
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MismatchPattern {
    pub predicted_decision: Decision,
    pub actual_status: DeliveryStatus,
    pub count: usize,
}

/// Mismatches grouped by prediction and outcome, most frequent first. Equal
/// counts keep first-seen order.
pub fn top_mismatch_patterns(window: &[OutcomeRecord]) -> Vec<MismatchPattern> {
    let mut patterns: Vec<MismatchPattern> = Vec::new();
    for o in window.iter().filter(|o| o.mismatch_flag) {
        match patterns
            .iter_mut()
            .find(|p| p.predicted_decision == o.predicted_decision && p.actual_status == o.actual_status)
        {
            Some(p) => p.count += 1,
            None => patterns.push(MismatchPattern {
                predicted_decision: o.predicted_decision,
                actual_status: o.actual_status,
                count: 1,
            }),
        }
    }
    patterns.sort_by(|a, b| b.count.cmp(&a.count));
    patterns
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LearningRecommendations {
    pub risk_engine: Vec<String>,
    pub address_intelligence: Vec<String>,
    pub decision_gate: Vec<String>,
    pub note: Option<String>,
}

pub fn learning_recommendations(window: &[OutcomeRecord]) -> LearningRecommendations {
    if window.is_empty() {
        return LearningRecommendations {
            note: Some("insufficient data for recommendations".to_string()),
            ..LearningRecommendations::default()
        };
    }

    let stats = outcome_statistics(window);
    let mut recs = LearningRecommendations::default();

    if stats.mismatch_rate > 0.15 {
        recs.risk_engine
            .push("recalibrate risk weights: high prediction error rate".to_string());
    }
    if stats.avg_prediction_accuracy < 75.0 {
        recs.risk_engine
            .push("consider adding risk factors or refining existing ones".to_string());
    }

    let failed = window
        .iter()
        .filter(|o| o.actual_status == DeliveryStatus::FailedAttempt)
        .count();
    if ratio(failed, window.len()) > 0.10 {
        recs.address_intelligence
            .push("high failed-attempt rate: improve landmark and address detection".to_string());
    }

    if stats.override_rate > 0.15 {
        recs.decision_gate
            .push("high override rate: gate thresholds may be miscalibrated".to_string());
    }
    recs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(decision: Decision, status: DeliveryStatus, override_flag: bool) -> OutcomeRecord {
        OutcomeRecord {
            shipment_id: "S".to_string(),
            cycle_date: chrono::NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            predicted_decision: decision,
            predicted_risk_score: 40.0,
            actual_status: status,
            delay_minutes: 0,
            override_flag,
            mismatch_flag: false,
            prediction_accuracy: 80.0,
        }
    }

    #[test]
    fn empty_window_is_zero_not_error() {
        let stats = outcome_statistics(&[]);
        assert_eq!(stats.total_shipments, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(override_effectiveness(&[]).verdict, OverrideVerdict::NoOverrides);
        assert_eq!(learning_insights(&[]).len(), 1);
    }

    #[test]
    fn humans_ahead_when_overrides_deliver_more() {
        let window = vec![
            outcome(Decision::Delay, DeliveryStatus::Delivered, true),
            outcome(Decision::Delay, DeliveryStatus::Delivered, true),
            outcome(Decision::Dispatch, DeliveryStatus::FailedAttempt, false),
            outcome(Decision::Dispatch, DeliveryStatus::Delivered, false),
        ];
        let eff = override_effectiveness(&window);
        assert_eq!(eff.total_overrides, 2);
        assert_eq!(eff.override_success_rate, Some(1.0));
        assert_eq!(eff.model_success_rate, Some(0.5));
        assert_eq!(eff.verdict, OverrideVerdict::HumansAhead);

        let stats = outcome_statistics(&window);
        assert_eq!(stats.decision_distribution.get(&Decision::Delay), Some(&2));
        assert_eq!(stats.status_distribution.len(), 2);
        assert_eq!(stats.status_distribution.get(&DeliveryStatus::Delivered), Some(&3));
    }

    #[test]
    fn breakdowns_group_by_bucket_and_decision() {
        let mut high = outcome(Decision::Delay, DeliveryStatus::FailedAttempt, false);
        high.predicted_risk_score = 75.0;
        high.prediction_accuracy = 50.0;
        let mut low = outcome(Decision::Dispatch, DeliveryStatus::Delivered, false);
        low.predicted_risk_score = 12.0;
        low.prediction_accuracy = 100.0;
        let mut late = low.clone();
        late.delay_minutes = 30;

        let window = vec![high, low, late];
        let buckets = risk_bucket_performance(&window);
        assert_eq!(buckets[&RiskCategory::High].shipments, 1);
        assert_eq!(buckets[&RiskCategory::High].success_rate, 0.0);
        assert_eq!(buckets[&RiskCategory::Low].avg_prediction_accuracy, 100.0);
        assert!(!buckets.contains_key(&RiskCategory::Medium));

        let decisions = decision_performance(&window);
        assert_eq!(decisions[&Decision::Dispatch].shipments, 2);
        assert_eq!(decisions[&Decision::Dispatch].delay_rate, 0.5);
        assert_eq!(decisions[&Decision::Delay].success_rate, 0.0);
    }

    #[test]
    fn mismatch_patterns_sorted_by_count() {
        let mut window = Vec::new();
        let mut rare = outcome(Decision::Reschedule, DeliveryStatus::Delivered, false);
        rare.mismatch_flag = true;
        window.push(rare);
        for _ in 0..3 {
            let mut o = outcome(Decision::Dispatch, DeliveryStatus::FailedAttempt, false);
            o.mismatch_flag = true;
            window.push(o);
        }
        window.push(outcome(Decision::Dispatch, DeliveryStatus::Delivered, false));

        let patterns = top_mismatch_patterns(&window);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].predicted_decision, Decision::Dispatch);
        assert_eq!(patterns[0].count, 3);
        assert_eq!(patterns[1].actual_status, DeliveryStatus::Delivered);
        assert!(top_mismatch_patterns(&[]).is_empty());
    }

    #[test]
    fn recommendations_follow_thresholds() {
        assert!(learning_recommendations(&[]).note.is_some());

        let mut bad = outcome(Decision::Dispatch, DeliveryStatus::FailedAttempt, true);
        bad.mismatch_flag = true;
        bad.prediction_accuracy = 20.0;
        let recs = learning_recommendations(&[bad.clone(), bad]);
        assert_eq!(recs.risk_engine.len(), 2);
        assert_eq!(recs.address_intelligence.len(), 1);
        assert_eq!(recs.decision_gate.len(), 1);
        assert!(recs.note.is_none());

        let good = outcome(Decision::Dispatch, DeliveryStatus::Delivered, false);
        let quiet = learning_recommendations(&[good]);
        assert!(quiet.risk_engine.is_empty());
        assert!(quiet.decision_gate.is_empty());
    }
}
