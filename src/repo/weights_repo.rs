use crate::risk::types::{AdjustmentRecord, FactorValues, LearningSignals, WeightSet, HISTORY_CAPACITY};
use anyhow::Result;
use sqlx::{PgPool, Row};
use std::collections::VecDeque;

const CONFIG_ID: &str = "default";

#[derive(Clone)]
pub struct WeightsRepo {
    pub pool: PgPool,
}

impl WeightsRepo {
    pub async fn load(&self) -> Result<Option<WeightSet>> {
        let row = sqlx::query(
            "SELECT cod_risk, address_risk, weather_risk, area_risk, weight_risk, last_updated, update_count FROM weight_sets WHERE config_id=$1",
        )
        .bind(CONFIG_ID)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let history = self.recent_adjustments(HISTORY_CAPACITY as i64).await?;

        Ok(Some(WeightSet {
            weights: FactorValues {
                cod_risk: row.get("cod_risk"),
                address_risk: row.get("address_risk"),
                weather_risk: row.get("weather_risk"),
                area_risk: row.get("area_risk"),
                weight_risk: row.get("weight_risk"),
            },
            last_updated: row.get("last_updated"),
            update_count: row.get("update_count"),
            adjustment_history: history,
        }))
    }

    /// First writer wins; returns whatever row is current afterwards.
    pub async fn insert_if_absent(&self, set: &WeightSet) -> Result<WeightSet> {
        sqlx::query(
            r#"
            INSERT INTO weight_sets (
                config_id, cod_risk, address_risk, weather_risk, area_risk, weight_risk, last_updated, update_count
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            ON CONFLICT (config_id) DO NOTHING
            "#,
        )
        .bind(CONFIG_ID)
        .bind(set.weights.cod_risk)
        .bind(set.weights.address_risk)
        .bind(set.weights.weather_risk)
        .bind(set.weights.area_risk)
        .bind(set.weights.weight_risk)
        .bind(set.last_updated)
        .bind(set.update_count)
        .execute(&self.pool)
        .await?;

        Ok(self.load().await?.unwrap_or_else(|| set.clone()))
    }

    /// Compare-and-swap on `update_count`. The newest history entry is written
    /// in the same transaction.
    pub async fn swap(&self, expected_version: i64, set: &WeightSet) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE weight_sets
            SET cod_risk=$2, address_risk=$3, weather_risk=$4, area_risk=$5, weight_risk=$6,
                last_updated=$7, update_count=$8
            WHERE config_id=$1 AND update_count=$9
            "#,
        )
        .bind(CONFIG_ID)
        .bind(set.weights.cod_risk)
        .bind(set.weights.address_risk)
        .bind(set.weights.weather_risk)
        .bind(set.weights.area_risk)
        .bind(set.weights.weight_risk)
        .bind(set.last_updated)
        .bind(set.update_count)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        if let Some(latest) = set.adjustment_history.back() {
            sqlx::query(
                r#"
                INSERT INTO weight_adjustments (
                    config_id, update_count, created_at, high_risk_failures, low_risk_successes,
                    missed_risks, adjustments_json, new_weights_json
                ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
                "#,
            )
            .bind(CONFIG_ID)
            .bind(set.update_count)
            .bind(latest.timestamp)
            .bind(latest.signals.high_risk_failures as i32)
            .bind(latest.signals.low_risk_successes as i32)
            .bind(latest.signals.missed_risks as i32)
            .bind(serde_json::to_value(latest.adjustments)?)
            .bind(serde_json::to_value(latest.new_weights)?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn recent_adjustments(&self, limit: i64) -> Result<VecDeque<AdjustmentRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT created_at, high_risk_failures, low_risk_successes, missed_risks, adjustments_json, new_weights_json
            FROM weight_adjustments WHERE config_id=$1
            ORDER BY update_count DESC LIMIT $2
            "#,
        )
        .bind(CONFIG_ID)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut out = VecDeque::with_capacity(rows.len());
        for row in rows.into_iter().rev() {
            out.push_back(AdjustmentRecord {
                timestamp: row.get("created_at"),
                signals: LearningSignals {
                    high_risk_failures: row.get::<i32, _>("high_risk_failures") as usize,
                    low_risk_successes: row.get::<i32, _>("low_risk_successes") as usize,
                    missed_risks: row.get::<i32, _>("missed_risks") as usize,
                },
                adjustments: serde_json::from_value(row.get("adjustments_json"))?,
                new_weights: serde_json::from_value(row.get("new_weights_json"))?,
            });
        }
        Ok(out)
    }
}
