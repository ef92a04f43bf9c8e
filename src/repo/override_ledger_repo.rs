use crate::domain::decision::Decision;
use crate::domain::overrides::{OverrideReason, OverrideRecord};
use anyhow::{anyhow, Result};
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct OverrideLedgerRepo {
    pub pool: PgPool,
}

impl OverrideLedgerRepo {
    pub async fn append(&self, record: &OverrideRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO override_ledger (
                override_id, shipment_id, ai_decision, override_decision, override_reason,
                created_at, manual_lock, superseded_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            "#,
        )
        .bind(record.override_id)
        .bind(&record.shipment_id)
        .bind(record.ai_decision.as_str())
        .bind(record.override_decision.as_str())
        .bind(record.override_reason.as_str())
        .bind(record.timestamp)
        .bind(record.manual_lock)
        .bind(record.superseded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn supersede(
        &self,
        shipment_id: &str,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64> {
        let done = sqlx::query(
            "UPDATE override_ledger SET superseded_at=$2 WHERE shipment_id=$1 AND superseded_at IS NULL",
        )
        .bind(shipment_id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(done.rows_affected())
    }

    pub async fn list_all(&self) -> Result<Vec<OverrideRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT override_id, shipment_id, ai_decision, override_decision, override_reason,
                   created_at, manual_lock, superseded_at
            FROM override_ledger ORDER BY created_at, override_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let ai: String = r.get("ai_decision");
                let target: String = r.get("override_decision");
                let reason: String = r.get("override_reason");
                Ok(OverrideRecord {
                    override_id: r.get("override_id"),
                    shipment_id: r.get("shipment_id"),
                    ai_decision: Decision::parse(&ai).ok_or_else(|| anyhow!("bad ai_decision {ai}"))?,
                    override_decision: Decision::parse(&target)
                        .ok_or_else(|| anyhow!("bad override_decision {target}"))?,
                    override_reason: OverrideReason::parse(&reason)
                        .ok_or_else(|| anyhow!("bad override_reason {reason}"))?,
                    timestamp: r.get("created_at"),
                    manual_lock: r.get("manual_lock"),
                    superseded_at: r.get("superseded_at"),
                })
            })
            .collect()
    }
}
