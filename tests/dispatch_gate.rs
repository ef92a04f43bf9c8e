use dispatch_gate::domain::decision::{Decision, DecisionReason};
use dispatch_gate::gate::actions::{action_items, explain, requires_customer_contact, should_dispatch};
use dispatch_gate::gate::evaluator::{decide_dispatch, evaluate};

#[test]
fn risk_and_weather_delay_shipment() {
    let out = decide_dispatch(75.0, 70.0, 80.0);
    assert_eq!(out.decision, Decision::Delay);
    assert_eq!(
        out.reasons,
        vec![DecisionReason::HighDeliveryRisk, DecisionReason::SevereWeatherImpact]
    );
}

#[test]
fn low_address_confidence_dominates() {
    let out = decide_dispatch(40.0, 20.0, 45.0);
    assert_eq!(out.decision, Decision::Reschedule);
    assert!(out.reasons.contains(&DecisionReason::LowAddressConfidence));

    let all_bad = decide_dispatch(95.0, 95.0, 10.0);
    assert_eq!(all_bad.decision, Decision::Reschedule);
    assert_eq!(all_bad.reasons.len(), 3);
}

#[test]
fn exact_thresholds_do_not_fire() {
    let out = decide_dispatch(60.0, 60.0, 60.0);
    assert_eq!(out.decision, Decision::Dispatch);
    assert!(out.reasons.is_empty());

    assert_eq!(decide_dispatch(60.01, 0.0, 100.0).decision, Decision::Delay);
    assert_eq!(decide_dispatch(0.0, 0.0, 59.99).decision, Decision::Reschedule);
}

#[test]
fn gate_is_total_over_grid() {
    let values = [0.0, 30.0, 59.0, 60.0, 61.0, 100.0];
    for &r in &values {
        for &w in &values {
            for &a in &values {
                let first = decide_dispatch(r, w, a);
                assert_eq!(first, decide_dispatch(r, w, a));
                let fired = r > 60.0 || w > 60.0 || a < 60.0;
                assert_eq!(first.decision == Decision::Dispatch, !fired);
            }
        }
    }
}

#[test]
fn reasons_serialize_as_labels() {
    let record = evaluate("SHP-9", 75.0, 70.0, 80.0);
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["decision"], "DELAY");
    assert_eq!(
        json["reasons"],
        serde_json::json!(["High delivery risk", "Severe weather impact"])
    );
}

#[test]
fn explanation_and_actions_follow_decision() {
    let delay = evaluate("SHP-10", 75.0, 70.0, 80.0);
    assert!(!should_dispatch(&delay));
    assert!(!requires_customer_contact(&delay));
    assert!(explain(&delay).contains("High delivery risk and Severe weather impact"));
    let items = action_items(&delay);
    assert!(items.contains(&"Monitor weather conditions"));
    assert!(items.contains(&"Assign experienced rider"));

    let reschedule = evaluate("SHP-11", 10.0, 10.0, 30.0);
    assert!(requires_customer_contact(&reschedule));
    assert!(action_items(&reschedule).contains(&"Do not dispatch"));

    let go = evaluate("SHP-12", 10.0, 10.0, 95.0);
    assert!(should_dispatch(&go));
    assert_eq!(action_items(&go).len(), 2);
}
