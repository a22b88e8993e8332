//! Grant expenditure models and queries.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GrantExpenditure {
    pub id: String,
    pub grant_id: String,
    pub amount: f64,
    pub expenditure_date: String,
    pub category: String,
    pub description: String,
    pub vendor_id: Option<String>,
    pub invoice_id: Option<String>,
    pub approved_by: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordExpenditureRequest {
    pub grant_id: String,
    pub amount: f64,
    pub expenditure_date: String,
    pub category: String,
    pub description: String,
    pub vendor_id: Option<String>,
    pub invoice_id: Option<String>,
    pub approved_by: Option<String>,
}

impl GrantExpenditure {
    pub fn from_request(req: &RecordExpenditureRequest, id: String, now: &str) -> Self {
        Self {
            id,
            grant_id: req.grant_id.clone(),
            amount: req.amount,
            expenditure_date: super::normalize_timestamp(&req.expenditure_date),
            category: req.category.clone(),
            description: req.description.clone(),
            vendor_id: req.vendor_id.clone(),
            invoice_id: req.invoice_id.clone(),
            approved_by: req.approved_by.clone(),
            created_at: now.to_string(),
        }
    }

    /// Expenditures of one grant, most recent first
    pub async fn list_for_grant<'e, E: SqliteExecutor<'e>>(
        db: E,
        grant_id: &str,
    ) -> Result<Vec<GrantExpenditure>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM grant_expenditures WHERE grant_id = ? ORDER BY expenditure_date DESC",
        )
        .bind(grant_id)
        .fetch_all(db)
        .await
    }

    /// Sum of everything spent against one grant
    pub async fn total_for_grant<'e, E: SqliteExecutor<'e>>(
        db: E,
        grant_id: &str,
    ) -> Result<f64, sqlx::Error> {
        let (total,): (f64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0.0) FROM grant_expenditures WHERE grant_id = ?",
        )
        .bind(grant_id)
        .fetch_one(db)
        .await?;
        Ok(total)
    }

    /// Spent totals keyed by grant id; grants without spending are absent
    pub async fn totals_by_grant<'e, E: SqliteExecutor<'e>>(
        db: E,
    ) -> Result<HashMap<String, f64>, sqlx::Error> {
        let rows: Vec<(String, f64)> = sqlx::query_as(
            "SELECT grant_id, SUM(amount) FROM grant_expenditures GROUP BY grant_id",
        )
        .fetch_all(db)
        .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn count_for_grant<'e, E: SqliteExecutor<'e>>(
        db: E,
        grant_id: &str,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM grant_expenditures WHERE grant_id = ?")
                .bind(grant_id)
                .fetch_one(db)
                .await?;
        Ok(count)
    }

    pub async fn insert<'e, E: SqliteExecutor<'e>>(&self, db: E) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO grant_expenditures (
                id, grant_id, amount, expenditure_date, category, description,
                vendor_id, invoice_id, approved_by, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.id)
        .bind(&self.grant_id)
        .bind(self.amount)
        .bind(&self.expenditure_date)
        .bind(&self.category)
        .bind(&self.description)
        .bind(&self.vendor_id)
        .bind(&self.invoice_id)
        .bind(&self.approved_by)
        .bind(&self.created_at)
        .execute(db)
        .await?;
        Ok(())
    }
}
