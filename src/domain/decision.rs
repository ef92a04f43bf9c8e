use crate::domain::shipment::normalize_label;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Dispatch,
    Delay,
    Reschedule,
}

impl Decision {
    pub const ALL: [Decision; 3] = [Decision::Dispatch, Decision::Delay, Decision::Reschedule];

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Dispatch => "DISPATCH",
            Decision::Delay => "DELAY",
            Decision::Reschedule => "RESCHEDULE",
        }
    }

    /// Lenient: accepts any casing and surrounding whitespace. For stored
    /// rows and collaborator input.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::parse_exact(&normalize_label(raw))
    }

    /// Only the canonical wire labels. Manager input is validated with this.
    pub fn parse_exact(raw: &str) -> Option<Self> {
        match raw {
            "DISPATCH" => Some(Decision::Dispatch),
            "DELAY" => Some(Decision::Delay),
            "RESCHEDULE" => Some(Decision::Reschedule),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DecisionReason {
    #[serde(rename = "High delivery risk")]
    HighDeliveryRisk,
    #[serde(rename = "Severe weather impact")]
    SevereWeatherImpact,
    #[serde(rename = "Low address confidence")]
    LowAddressConfidence,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionReason::HighDeliveryRisk => "High delivery risk",
            DecisionReason::SevereWeatherImpact => "Severe weather impact",
            DecisionReason::LowAddressConfidence => "Low address confidence",
        }
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one gate evaluation. Immutable once built; persisting it is the
/// caller's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionRecord {
    pub shipment_id: String,
    pub risk_score: f64,
    pub weather_impact: f64,
    pub address_confidence: f64,
    pub decision: Decision,
    pub reasons: Vec<DecisionReason>,
}
