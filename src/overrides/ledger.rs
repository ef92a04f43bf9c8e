use crate::domain::decision::Decision;
use crate::domain::overrides::{
    OverrideOutcome, OverrideReason, OverrideRecord, OverrideStatus, UnlockOutcome, UnlockStatus,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum OverridePlan {
    Rejected(OverrideOutcome),
    Agreed(OverrideOutcome),
    Append(OverrideRecord),
}

fn rejected(final_decision: Option<Decision>, message: String) -> OverridePlan {
    OverridePlan::Rejected(OverrideOutcome {
        status: OverrideStatus::Error,
        final_decision,
        locked: false,
        message,
    })
}

/// Validates a manager's request without touching any ledger. Only an
/// `Append` plan may be written.
pub fn plan_override(
    shipment_id: &str,
    ai_decision: &str,
    override_decision: &str,
    reason: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> OverridePlan {
    let ai = Decision::parse_exact(ai_decision);

    let Some(reason) = OverrideReason::parse(reason) else {
        let catalog = OverrideReason::CATALOG.map(|r| r.as_str()).join(", ");
        return rejected(ai, format!("invalid reason; must be one of: {catalog}"));
    };

    let (Some(ai), Some(target)) = (ai, Decision::parse_exact(override_decision)) else {
        return rejected(ai, "invalid decision; must be one of: DISPATCH, DELAY, RESCHEDULE".to_string());
    };

    if ai == target {
        return OverridePlan::Agreed(OverrideOutcome {
            status: OverrideStatus::NoOverride,
            final_decision: Some(ai),
            locked: false,
            message: "manager agrees with model decision".to_string(),
        });
    }

    OverridePlan::Append(OverrideRecord {
        override_id: Uuid::new_v4(),
        shipment_id: shipment_id.to_string(),
        ai_decision: ai,
        override_decision: target,
        override_reason: reason,
        timestamp: now,
        manual_lock: true,
        superseded_at: None,
    })
}

/// Append-only override history with an incrementally maintained index of
/// the active rows per shipment.
#[derive(Debug, Clone, Default)]
pub struct OverrideLedger {
    records: Vec<OverrideRecord>,
    active: HashMap<String, Vec<usize>>,
}

impl OverrideLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<OverrideRecord>) -> Self {
        let mut ledger = Self::new();
        for record in records {
            ledger.push(record);
        }
        ledger
    }

    fn push(&mut self, record: OverrideRecord) {
        let idx = self.records.len();
        if record.is_active() {
            self.active.entry(record.shipment_id.clone()).or_default().push(idx);
        }
        self.records.push(record);
    }

    pub fn append(&mut self, record: OverrideRecord) -> OverrideOutcome {
        let outcome = OverrideOutcome {
            status: OverrideStatus::Overridden,
            final_decision: Some(record.override_decision),
            locked: record.manual_lock,
            message: format!(
                "model decision {} overridden to {}",
                record.ai_decision, record.override_decision
            ),
        };
        self.push(record);
        outcome
    }

    pub fn apply_override(
        &mut self,
        shipment_id: &str,
        ai_decision: &str,
        override_decision: &str,
        reason: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> OverrideOutcome {
        match plan_override(shipment_id, ai_decision, override_decision, reason, now) {
            OverridePlan::Rejected(outcome) | OverridePlan::Agreed(outcome) => outcome,
            OverridePlan::Append(record) => self.append(record),
        }
    }

    pub fn is_locked(&self, shipment_id: &str) -> bool {
        self.active_lock(shipment_id).is_some()
    }

    /// Latest active row holding a manual lock.
    pub fn active_lock(&self, shipment_id: &str) -> Option<&OverrideRecord> {
        self.active
            .get(shipment_id)?
            .iter()
            .rev()
            .map(|&i| &self.records[i])
            .find(|r| r.manual_lock)
    }

    pub fn has_active(&self, shipment_id: &str) -> bool {
        self.active.get(shipment_id).is_some_and(|rows| !rows.is_empty())
    }

    /// Latest row for the shipment, superseded or not.
    pub fn latest_for(&self, shipment_id: &str) -> Option<&OverrideRecord> {
        self.records.iter().rev().find(|r| r.shipment_id == shipment_id)
    }

    /// Releases the lock by tagging every active row as superseded. Nothing
    /// is removed from history.
    pub fn unlock(&mut self, shipment_id: &str, now: chrono::DateTime<chrono::Utc>) -> UnlockOutcome {
        let Some(rows) = self.active.remove(shipment_id).filter(|rows| !rows.is_empty()) else {
            return UnlockOutcome {
                status: UnlockStatus::NotFound,
                released_records: 0,
                message: format!("no active override for {shipment_id}"),
            };
        };

        for &i in &rows {
            self.records[i].superseded_at = Some(now);
        }

        UnlockOutcome {
            status: UnlockStatus::Unlocked,
            released_records: rows.len(),
            message: format!("manual lock removed from {shipment_id}"),
        }
    }

    pub fn history(&self, shipment_id: Option<&str>) -> Vec<&OverrideRecord> {
        self.records
            .iter()
            .filter(|r| shipment_id.map_or(true, |id| r.shipment_id == id))
            .collect()
    }

    pub fn active_records(&self) -> impl Iterator<Item = &OverrideRecord> {
        self.records.iter().filter(|r| r.is_active())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
