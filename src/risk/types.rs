use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const MIN_WEIGHT: i32 = 5;
pub const MAX_WEIGHT: i32 = 30;
pub const HISTORY_CAPACITY: usize = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    CodRisk,
    AddressRisk,
    WeatherRisk,
    AreaRisk,
    WeightRisk,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 5] = [
        RiskFactor::CodRisk,
        RiskFactor::AddressRisk,
        RiskFactor::WeatherRisk,
        RiskFactor::AreaRisk,
        RiskFactor::WeightRisk,
    ];
}

pub fn clamp_weight(v: i32) -> i32 {
    v.clamp(MIN_WEIGHT, MAX_WEIGHT)
}

/// One integer per factor. Used both for weights and for per-cycle deltas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FactorValues {
    pub cod_risk: i32,
    pub address_risk: i32,
    pub weather_risk: i32,
    pub area_risk: i32,
    pub weight_risk: i32,
}

impl FactorValues {
    pub fn get(&self, factor: RiskFactor) -> i32 {
        match factor {
            RiskFactor::CodRisk => self.cod_risk,
            RiskFactor::AddressRisk => self.address_risk,
            RiskFactor::WeatherRisk => self.weather_risk,
            RiskFactor::AreaRisk => self.area_risk,
            RiskFactor::WeightRisk => self.weight_risk,
        }
    }

    pub fn slot(&mut self, factor: RiskFactor) -> &mut i32 {
        match factor {
            RiskFactor::CodRisk => &mut self.cod_risk,
            RiskFactor::AddressRisk => &mut self.address_risk,
            RiskFactor::WeatherRisk => &mut self.weather_risk,
            RiskFactor::AreaRisk => &mut self.area_risk,
            RiskFactor::WeightRisk => &mut self.weight_risk,
        }
    }

    pub fn default_weights() -> Self {
        Self {
            cod_risk: 15,
            address_risk: 15,
            weather_risk: 20,
            area_risk: 15,
            weight_risk: 10,
        }
    }

    pub fn clamped(mut self) -> Self {
        for factor in RiskFactor::ALL {
            let slot = self.slot(factor);
            *slot = clamp_weight(*slot);
        }
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LearningSignals {
    pub high_risk_failures: usize,
    pub low_risk_successes: usize,
    pub missed_risks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdjustmentRecord {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub signals: LearningSignals,
    pub adjustments: FactorValues,
    pub new_weights: FactorValues,
}

/// Process-wide scoring weights. `update_count` doubles as the version used
/// for compare-and-swap replacement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightSet {
    pub weights: FactorValues,
    pub last_updated: chrono::DateTime<chrono::Utc>,
    pub update_count: i64,
    pub adjustment_history: VecDeque<AdjustmentRecord>,
}

impl WeightSet {
    pub fn with_defaults(now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            weights: FactorValues::default_weights(),
            last_updated: now,
            update_count: 0,
            adjustment_history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    pub fn weight(&self, factor: RiskFactor) -> i32 {
        self.weights.get(factor)
    }

    /// UTC date of the most recent learning cycle, if any has run.
    pub fn last_cycle_date(&self) -> Option<chrono::NaiveDate> {
        self.adjustment_history.back().map(|r| r.timestamp.date_naive())
    }

    pub fn push_history(&mut self, record: AdjustmentRecord) {
        while self.adjustment_history.len() >= HISTORY_CAPACITY {
            self.adjustment_history.pop_front();
        }
        self.adjustment_history.push_back(record);
    }
}

impl Default for WeightSet {
    fn default() -> Self {
        Self::with_defaults(chrono::Utc::now())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskBreakdown {
    pub cod: f64,
    pub weight: f64,
    pub area: f64,
    pub road: f64,
    pub address: f64,
    pub weather: f64,
    pub priority: f64,
    pub raw_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub score: i32,
    pub category: RiskCategory,
    pub weights_version: i64,
    pub breakdown: RiskBreakdown,
}
