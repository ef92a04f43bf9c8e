use crate::domain::decision::Decision;
use crate::domain::overrides::{OverrideReason, OverrideRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReasonCount {
    pub reason: OverrideReason,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionCount {
    pub from: Decision,
    pub to: Decision,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OverrideStats {
    pub total_overrides: usize,
    pub most_common_reason: Option<OverrideReason>,
    pub to_dispatch: usize,
    pub to_delay: usize,
    pub to_reschedule: usize,
    pub reason_distribution: Vec<ReasonCount>,
    pub transitions: Vec<TransitionCount>,
}

/// Recomputed on every call. Distributions keep first-seen order, which is
/// also the tie-break for the most common reason.
pub fn override_stats<'a>(records: impl IntoIterator<Item = &'a OverrideRecord>) -> OverrideStats {
    let mut stats = OverrideStats::default();

    for record in records {
        stats.total_overrides += 1;
        match record.override_decision {
            Decision::Dispatch => stats.to_dispatch += 1,
            Decision::Delay => stats.to_delay += 1,
            Decision::Reschedule => stats.to_reschedule += 1,
        }

        match stats
            .reason_distribution
            .iter_mut()
            .find(|c| c.reason == record.override_reason)
        {
            Some(c) => c.count += 1,
            None => stats.reason_distribution.push(ReasonCount {
                reason: record.override_reason,
                count: 1,
            }),
        }

        match stats
            .transitions
            .iter_mut()
            .find(|t| t.from == record.ai_decision && t.to == record.override_decision)
        {
            Some(t) => t.count += 1,
            None => stats.transitions.push(TransitionCount {
                from: record.ai_decision,
                to: record.override_decision,
                count: 1,
            }),
        }
    }

    let mut best: Option<&ReasonCount> = None;
    for c in &stats.reason_distribution {
        if best.map_or(true, |b| c.count > b.count) {
            best = Some(c);
        }
    }
    stats.most_common_reason = best.map(|b| b.reason);
    stats
}
