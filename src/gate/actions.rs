use crate::domain::decision::{Decision, DecisionReason, DecisionRecord};
use crate::domain::overrides::OverrideRecord;
use serde::Serialize;

pub fn should_dispatch(record: &DecisionRecord) -> bool {
    record.decision == Decision::Dispatch
}

pub fn requires_customer_contact(record: &DecisionRecord) -> bool {
    record.decision == Decision::Reschedule
}

pub fn explain(record: &DecisionRecord) -> String {
    match record.decision {
        Decision::Dispatch => "DISPATCH: all signals safe, proceed with normal delivery".to_string(),
        Decision::Delay => {
            let joined = record
                .reasons
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(" and ");
            format!("DELAY: {joined}. Buffer ETA and warn the customer of a possible delay")
        }
        Decision::Reschedule => {
            "RESCHEDULE: low address confidence, confirm the address with the customer before dispatch"
                .to_string()
        }
    }
}

pub fn action_items(record: &DecisionRecord) -> Vec<&'static str> {
    actions_for(record.decision, &record.reasons)
}

pub fn actions_for(decision: Decision, reasons: &[DecisionReason]) -> Vec<&'static str> {
    let mut actions = Vec::new();
    match decision {
        Decision::Dispatch => {
            actions.push("Proceed with dispatch");
            actions.push("Follow normal delivery process");
        }
        Decision::Delay => {
            actions.push("Hold shipment at hub");
            actions.push("Buffer ETA by 1.5-2x normal time");
            actions.push("Send pre-dispatch alert to customer");
            if reasons.contains(&DecisionReason::SevereWeatherImpact) {
                actions.push("Monitor weather conditions");
                actions.push("Reassess after weather improves");
            }
            if reasons.contains(&DecisionReason::HighDeliveryRisk) {
                actions.push("Assign experienced rider");
                actions.push("Consider alternate route");
            }
        }
        Decision::Reschedule => {
            actions.push("Do not dispatch");
            actions.push("Contact customer via app, message or call");
            actions.push("Request address clarification or landmark details");
            actions.push("Update address before reattempt");
        }
    }
    actions
}

pub fn explain_override(lock: &OverrideRecord) -> String {
    format!(
        "{}: manual override in force ({}); model decision {} is superseded until unlocked",
        lock.override_decision, lock.override_reason, lock.ai_decision
    )
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShipmentExplanation {
    pub shipment_id: String,
    pub decision: Decision,
    pub locked: bool,
    pub explanation: String,
    pub action_items: Vec<&'static str>,
    pub should_dispatch: bool,
    pub requires_customer_contact: bool,
    pub record: Option<DecisionRecord>,
    pub override_record: Option<OverrideRecord>,
}

/// An active lock is binding: the explanation and checklist describe the
/// manager's decision, not the gate's. `None` when neither exists.
pub fn explain_shipment(
    shipment_id: &str,
    record: Option<DecisionRecord>,
    lock: Option<OverrideRecord>,
) -> Option<ShipmentExplanation> {
    let (decision, explanation, items) = match (&lock, &record) {
        (Some(lock), _) => {
            let mut items = vec!["Manual override in force: do not re-run the gate"];
            items.extend(actions_for(lock.override_decision, &[]));
            (lock.override_decision, explain_override(lock), items)
        }
        (None, Some(record)) => (record.decision, explain(record), action_items(record)),
        (None, None) => return None,
    };

    Some(ShipmentExplanation {
        shipment_id: shipment_id.to_string(),
        decision,
        locked: lock.is_some(),
        explanation,
        action_items: items,
        should_dispatch: decision == Decision::Dispatch,
        requires_customer_contact: decision == Decision::Reschedule,
        record,
        override_record: lock,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::evaluator::evaluate;

    #[test]
    fn delay_actions_follow_reasons() {
        let rec = evaluate("S1", 75.0, 70.0, 80.0);
        let items = action_items(&rec);
        assert!(items.contains(&"Monitor weather conditions"));
        assert!(items.contains(&"Assign experienced rider"));
        assert!(explain(&rec).contains("High delivery risk and Severe weather impact"));
        assert!(!should_dispatch(&rec));
    }

    #[test]
    fn reschedule_needs_customer() {
        let rec = evaluate("S2", 40.0, 20.0, 45.0);
        assert!(requires_customer_contact(&rec));
        assert_eq!(action_items(&rec)[0], "Do not dispatch");
    }

    #[test]
    fn lock_overrides_recorded_decision() {
        let rec = evaluate("S3", 75.0, 70.0, 80.0);
        let now = chrono::Utc::now();
        let lock = match crate::overrides::ledger::plan_override("S3", "DELAY", "DISPATCH", "Local knowledge", now) {
            crate::overrides::ledger::OverridePlan::Append(r) => r,
            other => panic!("unexpected plan {other:?}"),
        };

        let out = explain_shipment("S3", Some(rec.clone()), Some(lock)).unwrap();
        assert!(out.locked);
        assert_eq!(out.decision, Decision::Dispatch);
        assert!(out.should_dispatch);
        assert!(!out.action_items.contains(&"Hold shipment at hub"));
        assert!(out.explanation.starts_with("DISPATCH: manual override"));

        let plain = explain_shipment("S3", Some(rec), None).unwrap();
        assert!(!plain.locked);
        assert_eq!(plain.action_items[0], "Hold shipment at hub");
        assert!(explain_shipment("S4", None, None).is_none());
    }
}
