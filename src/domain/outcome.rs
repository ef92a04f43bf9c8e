use crate::domain::decision::Decision;
use crate::domain::shipment::normalize_label;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum DeliveryStatus {
    Created,
    Packing,
    Dispatched,
    InTransit,
    OutForDelivery,
    Delivered,
    PackingDelay,
    DeliveryDelay,
    FailedAttempt,
    Failed,
    Unknown,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Created => "CREATED",
            DeliveryStatus::Packing => "PACKING",
            DeliveryStatus::Dispatched => "DISPATCHED",
            DeliveryStatus::InTransit => "IN_TRANSIT",
            DeliveryStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::PackingDelay => "PACKING_DELAY",
            DeliveryStatus::DeliveryDelay => "DELIVERY_DELAY",
            DeliveryStatus::FailedAttempt => "FAILED_ATTEMPT",
            DeliveryStatus::Failed => "FAILED",
            DeliveryStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered)
    }

    pub fn is_delay(&self) -> bool {
        matches!(self, DeliveryStatus::PackingDelay | DeliveryStatus::DeliveryDelay)
    }

    pub fn is_failed_or_delayed(&self) -> bool {
        self.is_delay() || matches!(self, DeliveryStatus::FailedAttempt | DeliveryStatus::Failed)
    }
}

impl From<String> for DeliveryStatus {
    fn from(raw: String) -> Self {
        match normalize_label(&raw).as_str() {
            "CREATED" => Self::Created,
            "PACKING" => Self::Packing,
            "DISPATCHED" => Self::Dispatched,
            "IN_TRANSIT" => Self::InTransit,
            "OUT_FOR_DELIVERY" => Self::OutForDelivery,
            "DELIVERED" => Self::Delivered,
            "PACKING_DELAY" => Self::PackingDelay,
            "DELIVERY_DELAY" => Self::DeliveryDelay,
            "FAILED_ATTEMPT" => Self::FailedAttempt,
            "FAILED" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub shipment_id: String,
    pub status: DeliveryStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub remarks: String,
}

/// What the reconciler needs to know about one shipment at end of day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub shipment_id: String,
    pub cycle_date: chrono::NaiveDate,
    pub predicted_decision: Decision,
    pub predicted_risk_score: f64,
    pub actual_status: DeliveryStatus,
    #[serde(default)]
    pub delay_minutes: i32,
    #[serde(default)]
    pub override_flag: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutcomeRecord {
    pub shipment_id: String,
    pub cycle_date: chrono::NaiveDate,
    pub predicted_decision: Decision,
    pub predicted_risk_score: f64,
    pub actual_status: DeliveryStatus,
    pub delay_minutes: i32,
    pub override_flag: bool,
    pub mismatch_flag: bool,
    pub prediction_accuracy: f64,
}

impl OutcomeRecord {
    pub fn was_successful(&self) -> bool {
        self.actual_status.is_delivered()
    }

    pub fn had_delay(&self) -> bool {
        self.delay_minutes > 0
    }

    pub fn model_was_cautious(&self) -> bool {
        matches!(self.predicted_decision, Decision::Delay | Decision::Reschedule)
    }
}
