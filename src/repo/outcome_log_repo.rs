use crate::domain::decision::Decision;
use crate::domain::outcome::{DeliveryStatus, OutcomeRecord};
use anyhow::{anyhow, Result};
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct OutcomeLogRepo {
    pub pool: PgPool,
}

impl OutcomeLogRepo {
    /// Returns false when the shipment already has an outcome for that date.
    pub async fn insert(&self, record: &OutcomeRecord) -> Result<bool> {
        let done = sqlx::query(
            r#"
            INSERT INTO outcome_log (
                shipment_id, cycle_date, predicted_decision, predicted_risk_score, actual_status,
                delay_minutes, override_flag, mismatch_flag, prediction_accuracy
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
            ON CONFLICT (shipment_id, cycle_date) DO NOTHING
            "#,
        )
        .bind(&record.shipment_id)
        .bind(record.cycle_date)
        .bind(record.predicted_decision.as_str())
        .bind(record.predicted_risk_score)
        .bind(record.actual_status.as_str())
        .bind(record.delay_minutes)
        .bind(record.override_flag)
        .bind(record.mismatch_flag)
        .bind(record.prediction_accuracy)
        .execute(&self.pool)
        .await?;
        Ok(done.rows_affected() == 1)
    }

    pub async fn between(
        &self,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> Result<Vec<OutcomeRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT shipment_id, cycle_date, predicted_decision, predicted_risk_score, actual_status,
                   delay_minutes, override_flag, mismatch_flag, prediction_accuracy
            FROM outcome_log WHERE cycle_date >= $1 AND cycle_date <= $2
            ORDER BY cycle_date, created_at
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let decision: String = r.get("predicted_decision");
                Ok(OutcomeRecord {
                    shipment_id: r.get("shipment_id"),
                    cycle_date: r.get("cycle_date"),
                    predicted_decision: Decision::parse(&decision)
                        .ok_or_else(|| anyhow!("bad predicted_decision {decision}"))?,
                    predicted_risk_score: r.get("predicted_risk_score"),
                    actual_status: DeliveryStatus::from(r.get::<String, _>("actual_status")),
                    delay_minutes: r.get("delay_minutes"),
                    override_flag: r.get("override_flag"),
                    mismatch_flag: r.get("mismatch_flag"),
                    prediction_accuracy: r.get("prediction_accuracy"),
                })
            })
            .collect()
    }
}
