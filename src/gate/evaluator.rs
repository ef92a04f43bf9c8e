use crate::domain::decision::{Decision, DecisionReason, DecisionRecord};
use serde::{Deserialize, Serialize};

pub const RISK_THRESHOLD: f64 = 60.0;
pub const WEATHER_THRESHOLD: f64 = 60.0;
pub const ADDRESS_CONFIDENCE_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GateVerdict {
    pub decision: Decision,
    pub reasons: Vec<DecisionReason>,
}

/// Values sitting exactly on a threshold do not trip it. A low address
/// confidence forces RESCHEDULE whatever else fired.
pub fn decide_dispatch(risk_score: f64, weather_impact: f64, address_confidence: f64) -> GateVerdict {
    let mut reasons = Vec::new();

    if risk_score > RISK_THRESHOLD {
        reasons.push(DecisionReason::HighDeliveryRisk);
    }
    if weather_impact > WEATHER_THRESHOLD {
        reasons.push(DecisionReason::SevereWeatherImpact);
    }
    if address_confidence < ADDRESS_CONFIDENCE_THRESHOLD {
        reasons.push(DecisionReason::LowAddressConfidence);
    }

    let decision = if reasons.contains(&DecisionReason::LowAddressConfidence) {
        Decision::Reschedule
    } else if !reasons.is_empty() {
        Decision::Delay
    } else {
        Decision::Dispatch
    };

    GateVerdict { decision, reasons }
}

pub fn evaluate(
    shipment_id: &str,
    risk_score: f64,
    weather_impact: f64,
    address_confidence: f64,
) -> DecisionRecord {
    let verdict = decide_dispatch(risk_score, weather_impact, address_confidence);
    DecisionRecord {
        shipment_id: shipment_id.to_string(),
        risk_score,
        weather_impact,
        address_confidence,
        decision: verdict.decision,
        reasons: verdict.reasons,
    }
}
