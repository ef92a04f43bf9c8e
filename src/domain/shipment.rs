use serde::{Deserialize, Serialize};

/// "Old City", "old-city" and "OLD_CITY" all normalize to "OLD_CITY".
pub fn normalize_label(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c.to_ascii_uppercase() })
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum PaymentMode {
    Cod,
    Prepaid,
    Other,
}

impl From<String> for PaymentMode {
    fn from(raw: String) -> Self {
        match normalize_label(&raw).as_str() {
            "COD" => Self::Cod,
            "PREPAID" => Self::Prepaid,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum AreaType {
    OldCity,
    Urban,
    SemiUrban,
    Rural,
    Unknown,
}

impl From<String> for AreaType {
    fn from(raw: String) -> Self {
        match normalize_label(&raw).as_str() {
            "OLD_CITY" => Self::OldCity,
            "URBAN" => Self::Urban,
            "SEMI_URBAN" => Self::SemiUrban,
            "RURAL" => Self::Rural,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum RoadAccessibility {
    Wide,
    Medium,
    Narrow,
    Unknown,
}

impl From<String> for RoadAccessibility {
    fn from(raw: String) -> Self {
        match normalize_label(&raw).as_str() {
            "WIDE" => Self::Wide,
            "MEDIUM" => Self::Medium,
            "NARROW" => Self::Narrow,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum WeatherSeverity {
    Low,
    Medium,
    High,
    Unknown,
}

impl From<String> for WeatherSeverity {
    fn from(raw: String) -> Self {
        match normalize_label(&raw).as_str() {
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            _ => Self::Unknown,
        }
    }
}

/// Pre-dispatch signals for one shipment. Weather impact and address
/// confidence arrive already reduced to a 0-100 number by their providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactors {
    pub shipment_id: String,
    pub weight_kg: f64,
    pub volumetric_weight: f64,
    pub payment_mode: PaymentMode,
    #[serde(default)]
    pub priority: bool,
    pub area_type: AreaType,
    pub road_accessibility: RoadAccessibility,
    pub address_confidence: f64,
    pub weather_severity: WeatherSeverity,
    pub weather_impact: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_display_labels_and_degrades_unknown_values() {
        let raw = serde_json::json!({
            "shipment_id": "S1",
            "weight_kg": 2.0,
            "volumetric_weight": 3.0,
            "payment_mode": "COD",
            "area_type": "Old City",
            "road_accessibility": "Cobblestone",
            "address_confidence": 72.0,
            "weather_severity": "High",
            "weather_impact": 40.0
        });

        let factors: RiskFactors = serde_json::from_value(raw).unwrap();
        assert_eq!(factors.payment_mode, PaymentMode::Cod);
        assert_eq!(factors.area_type, AreaType::OldCity);
        assert_eq!(factors.road_accessibility, RoadAccessibility::Unknown);
        assert_eq!(factors.weather_severity, WeatherSeverity::High);
        assert!(!factors.priority);
    }

    #[test]
    fn serializes_canonical_labels() {
        assert_eq!(serde_json::to_value(AreaType::SemiUrban).unwrap(), "SEMI_URBAN");
        assert_eq!(AreaType::from("semi-urban".to_string()), AreaType::SemiUrban);
    }
}
