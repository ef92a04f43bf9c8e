use crate::domain::shipment::{AreaType, PaymentMode, RiskFactors, RoadAccessibility, WeatherSeverity};
use crate::risk::types::{RiskAssessment, RiskBreakdown, RiskCategory, RiskFactor, WeightSet};

pub const OVERSIZE_VOLUMETRIC_KG: f64 = 15.0;
pub const OVERWEIGHT_KG: f64 = 10.0;
pub const ADDRESS_LOW_CONFIDENCE: f64 = 60.0;
pub const ADDRESS_MEDIUM_CONFIDENCE: f64 = 80.0;
pub const NARROW_ROAD_PENALTY: f64 = 15.0;
pub const MEDIUM_ROAD_PENALTY: f64 = 7.0;
pub const PRIORITY_DISCOUNT: f64 = 5.0;

/// NaN collapses to the lower bound so a bad reading can never poison the sum.
pub fn clamp_unit(v: f64, lo: f64, hi: f64) -> f64 {
    if v.is_nan() || v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

pub fn risk_category(score: i32) -> RiskCategory {
    if score <= 30 {
        RiskCategory::Low
    } else if score <= 60 {
        RiskCategory::Medium
    } else {
        RiskCategory::High
    }
}

/// Fifteenths of the area weight.
fn area_share(area: AreaType) -> f64 {
    match area {
        AreaType::OldCity => 15.0,
        AreaType::Rural => 12.0,
        AreaType::SemiUrban => 8.0,
        AreaType::Urban | AreaType::Unknown => 0.0,
    }
}

fn road_penalty(road: RoadAccessibility) -> f64 {
    match road {
        RoadAccessibility::Narrow => NARROW_ROAD_PENALTY,
        RoadAccessibility::Medium => MEDIUM_ROAD_PENALTY,
        RoadAccessibility::Wide | RoadAccessibility::Unknown => 0.0,
    }
}

/// Share of impact × weight, in units of 1/2000. High at the default weight
/// of 20 gives impact × 0.3.
fn weather_share(severity: WeatherSeverity) -> f64 {
    match severity {
        WeatherSeverity::High => 30.0,
        WeatherSeverity::Medium => 15.0,
        WeatherSeverity::Low | WeatherSeverity::Unknown => 0.0,
    }
}

pub fn score_risk(factors: &RiskFactors, weights: &WeightSet) -> RiskAssessment {
    let w = |f: RiskFactor| weights.weight(f) as f64;

    let cod = if factors.payment_mode == PaymentMode::Cod {
        w(RiskFactor::CodRisk)
    } else {
        0.0
    };

    let mut weight = 0.0;
    if clamp_unit(factors.volumetric_weight, 0.0, f64::MAX) > OVERSIZE_VOLUMETRIC_KG {
        weight += w(RiskFactor::WeightRisk);
    }
    if clamp_unit(factors.weight_kg, 0.0, f64::MAX) > OVERWEIGHT_KG {
        weight += w(RiskFactor::WeightRisk) * 0.5;
    }

    let area = w(RiskFactor::AreaRisk) * area_share(factors.area_type) / 15.0;
    let road = road_penalty(factors.road_accessibility);

    let confidence = clamp_unit(factors.address_confidence, 0.0, 100.0);
    let address = if confidence < ADDRESS_LOW_CONFIDENCE {
        w(RiskFactor::AddressRisk)
    } else if confidence < ADDRESS_MEDIUM_CONFIDENCE {
        w(RiskFactor::AddressRisk) * 7.0 / 15.0
    } else {
        0.0
    };

    let impact = clamp_unit(factors.weather_impact, 0.0, 100.0);
    let weather = impact * w(RiskFactor::WeatherRisk) * weather_share(factors.weather_severity) / 2000.0;

    let priority = if factors.priority { -PRIORITY_DISCOUNT } else { 0.0 };

    let raw_total = cod + weight + area + road + address + weather + priority;
    let score = (raw_total.trunc() as i32).clamp(0, 100);

    RiskAssessment {
        score,
        category: risk_category(score),
        weights_version: weights.update_count,
        breakdown: RiskBreakdown {
            cod,
            weight,
            area,
            road,
            address,
            weather,
            priority,
            raw_total,
        },
    }
}
