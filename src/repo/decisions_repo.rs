use crate::domain::decision::{Decision, DecisionRecord};
use anyhow::{anyhow, Result};
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct DecisionsRepo {
    pub pool: PgPool,
}

impl DecisionsRepo {
    pub async fn insert(&self, record: &DecisionRecord, weights_version: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO dispatch_decisions (
                decision_id, shipment_id, risk_score, weather_impact, address_confidence,
                decision, reasons_json, weights_version
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.shipment_id)
        .bind(record.risk_score)
        .bind(record.weather_impact)
        .bind(record.address_confidence)
        .bind(record.decision.as_str())
        .bind(serde_json::to_value(&record.reasons)?)
        .bind(weights_version)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn latest_for(&self, shipment_id: &str) -> Result<Option<DecisionRecord>> {
        let row = sqlx::query(
            r#"
            SELECT shipment_id, risk_score, weather_impact, address_confidence, decision, reasons_json
            FROM dispatch_decisions WHERE shipment_id=$1
            ORDER BY created_at DESC LIMIT 1
            "#,
        )
        .bind(shipment_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let decision: String = r.get("decision");
        Ok(Some(DecisionRecord {
            shipment_id: r.get("shipment_id"),
            risk_score: r.get("risk_score"),
            weather_impact: r.get("weather_impact"),
            address_confidence: r.get("address_confidence"),
            decision: Decision::parse(&decision).ok_or_else(|| anyhow!("bad decision {decision}"))?,
            reasons: serde_json::from_value(r.get("reasons_json"))?,
        }))
    }
}
