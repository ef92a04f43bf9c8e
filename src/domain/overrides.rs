use crate::domain::decision::Decision;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OverrideReason {
    #[serde(rename = "Manager experience")]
    ManagerExperience,
    #[serde(rename = "Local knowledge")]
    LocalKnowledge,
    #[serde(rename = "Temporary road closure")]
    TemporaryRoadClosure,
    #[serde(rename = "High priority customer")]
    HighPriorityCustomer,
    #[serde(rename = "Operational constraint")]
    OperationalConstraint,
    #[serde(rename = "Weather cleared manually")]
    WeatherClearedManually,
}

impl OverrideReason {
    pub const CATALOG: [OverrideReason; 6] = [
        OverrideReason::ManagerExperience,
        OverrideReason::LocalKnowledge,
        OverrideReason::TemporaryRoadClosure,
        OverrideReason::HighPriorityCustomer,
        OverrideReason::OperationalConstraint,
        OverrideReason::WeatherClearedManually,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideReason::ManagerExperience => "Manager experience",
            OverrideReason::LocalKnowledge => "Local knowledge",
            OverrideReason::TemporaryRoadClosure => "Temporary road closure",
            OverrideReason::HighPriorityCustomer => "High priority customer",
            OverrideReason::OperationalConstraint => "Operational constraint",
            OverrideReason::WeatherClearedManually => "Weather cleared manually",
        }
    }

    /// Exact label match; the catalog is closed.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::CATALOG.into_iter().find(|r| r.as_str() == raw)
    }
}

impl fmt::Display for OverrideReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverrideRecord {
    pub override_id: Uuid,
    pub shipment_id: String,
    pub ai_decision: Decision,
    pub override_decision: Decision,
    pub override_reason: OverrideReason,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub manual_lock: bool,
    /// Set by an unlock. Superseded rows stay in the ledger for audit but no
    /// longer hold a lock.
    pub superseded_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl OverrideRecord {
    pub fn is_active(&self) -> bool {
        self.superseded_at.is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideStatus {
    Overridden,
    NoOverride,
    Error,
}

/// Callers must check `status` before trusting `final_decision`. It is `None`
/// only when the submitted AI decision itself was not a known decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverrideOutcome {
    pub status: OverrideStatus,
    pub final_decision: Option<Decision>,
    pub locked: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnlockStatus {
    Unlocked,
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnlockOutcome {
    pub status: UnlockStatus,
    pub released_records: usize,
    pub message: String,
}
