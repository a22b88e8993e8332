//! Receipts of grant funds.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GrantReceipt {
    pub id: String,
    pub grant_id: String,
    pub amount: f64,
    pub received_date: String,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiveFundsRequest {
    pub grant_id: String,
    pub amount: f64,
    pub received_date: String,
    pub notes: Option<String>,
}

impl GrantReceipt {
    pub fn from_request(req: &ReceiveFundsRequest, id: String, now: &str) -> Self {
        Self {
            id,
            grant_id: req.grant_id.clone(),
            amount: req.amount,
            received_date: super::normalize_timestamp(&req.received_date),
            notes: req.notes.clone(),
            created_at: now.to_string(),
        }
    }

    pub async fn list_for_grant<'e, E: SqliteExecutor<'e>>(
        db: E,
        grant_id: &str,
    ) -> Result<Vec<GrantReceipt>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM grant_receipts WHERE grant_id = ? ORDER BY received_date DESC",
        )
        .bind(grant_id)
        .fetch_all(db)
        .await
    }

    pub async fn insert<'e, E: SqliteExecutor<'e>>(&self, db: E) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO grant_receipts (id, grant_id, amount, received_date, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.id)
        .bind(&self.grant_id)
        .bind(self.amount)
        .bind(&self.received_date)
        .bind(&self.notes)
        .bind(&self.created_at)
        .execute(db)
        .await?;
        Ok(())
    }
}
