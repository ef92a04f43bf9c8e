use crate::domain::decision::Decision;
use crate::domain::outcome::{DeliveryStatus, Observation, OutcomeRecord, TrackingEvent};

pub const MINUTES_PER_DELAY_EVENT: i32 = 15;
pub const FAILED_ATTEMPT_PENALTY_MINUTES: i32 = 60;

/// Order matters: an override clears the model of blame before any other rule.
pub fn mismatch_detected(predicted: Decision, actual: DeliveryStatus, override_flag: bool) -> bool {
    if override_flag {
        return false;
    }
    match predicted {
        Decision::Dispatch => !actual.is_delivered(),
        Decision::Reschedule => actual.is_delivered(),
        // caution is tolerated
        Decision::Delay => false,
    }
}

pub fn prediction_accuracy(predicted: Decision, actual: DeliveryStatus) -> f64 {
    match (predicted, actual.is_delivered()) {
        (Decision::Dispatch, true) => 100.0,
        (Decision::Delay, true) => 80.0,
        (Decision::Dispatch, false) => 20.0,
        (Decision::Reschedule, false) if actual.is_failed_or_delayed() => 90.0,
        _ => 50.0,
    }
}

pub fn reconcile(obs: &Observation) -> OutcomeRecord {
    OutcomeRecord {
        shipment_id: obs.shipment_id.clone(),
        cycle_date: obs.cycle_date,
        predicted_decision: obs.predicted_decision,
        predicted_risk_score: obs.predicted_risk_score,
        actual_status: obs.actual_status,
        delay_minutes: obs.delay_minutes.max(0),
        override_flag: obs.override_flag,
        mismatch_flag: mismatch_detected(obs.predicted_decision, obs.actual_status, obs.override_flag),
        prediction_accuracy: prediction_accuracy(obs.predicted_decision, obs.actual_status),
    }
}

/// Last event wins; events are expected in arrival order.
pub fn final_status(events: &[TrackingEvent]) -> DeliveryStatus {
    events.last().map(|e| e.status).unwrap_or(DeliveryStatus::Unknown)
}

pub fn delay_minutes(events: &[TrackingEvent]) -> i32 {
    let delays = events.iter().filter(|e| e.status.is_delay()).count() as i32;
    let mut minutes = delays * MINUTES_PER_DELAY_EVENT;
    if final_status(events) == DeliveryStatus::FailedAttempt {
        minutes += FAILED_ATTEMPT_PENALTY_MINUTES;
    }
    minutes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(status: DeliveryStatus) -> TrackingEvent {
        TrackingEvent {
            shipment_id: "S1".to_string(),
            status,
            timestamp: chrono::Utc::now(),
            remarks: String::new(),
        }
    }

    #[test]
    fn reschedule_that_delivered_is_a_mismatch() {
        assert!(mismatch_detected(Decision::Reschedule, DeliveryStatus::Delivered, false));
        assert_eq!(prediction_accuracy(Decision::Reschedule, DeliveryStatus::Delivered), 50.0);
    }

    #[test]
    fn delay_that_delivered_is_tolerated() {
        assert!(!mismatch_detected(Decision::Delay, DeliveryStatus::Delivered, false));
        assert_eq!(prediction_accuracy(Decision::Delay, DeliveryStatus::Delivered), 80.0);
    }

    #[test]
    fn reschedule_that_failed_scores_ninety() {
        assert_eq!(prediction_accuracy(Decision::Reschedule, DeliveryStatus::FailedAttempt), 90.0);
        assert_eq!(prediction_accuracy(Decision::Reschedule, DeliveryStatus::DeliveryDelay), 90.0);
        assert_eq!(prediction_accuracy(Decision::Reschedule, DeliveryStatus::InTransit), 50.0);
        assert!(!mismatch_detected(Decision::Reschedule, DeliveryStatus::FailedAttempt, false));
    }

    #[test]
    fn delay_that_failed_is_neither_mismatch_nor_credited() {
        assert!(!mismatch_detected(Decision::Delay, DeliveryStatus::FailedAttempt, false));
        assert_eq!(prediction_accuracy(Decision::Delay, DeliveryStatus::FailedAttempt), 50.0);
    }

    #[test]
    fn event_reduction() {
        assert_eq!(final_status(&[]), DeliveryStatus::Unknown);
        assert_eq!(delay_minutes(&[]), 0);

        let events = vec![
            event(DeliveryStatus::Created),
            event(DeliveryStatus::PackingDelay),
            event(DeliveryStatus::OutForDelivery),
            event(DeliveryStatus::DeliveryDelay),
            event(DeliveryStatus::FailedAttempt),
        ];
        assert_eq!(final_status(&events), DeliveryStatus::FailedAttempt);
        assert_eq!(delay_minutes(&events), 90);
    }
}
