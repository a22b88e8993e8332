//! Non-grant funding source models and queries.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Grant,
    Donation,
    Sponsorship,
    Investment,
    Loan,
    Revenue,
    Other,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Grant => "grant",
            SourceType::Donation => "donation",
            SourceType::Sponsorship => "sponsorship",
            SourceType::Investment => "investment",
            SourceType::Loan => "loan",
            SourceType::Revenue => "revenue",
            SourceType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingStatus {
    Active,
    Inactive,
}

impl FundingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundingStatus::Active => "active",
            FundingStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FundingSource {
    pub id: String,
    pub name: String,
    pub source_type: String,
    pub amount: f64,
    pub currency: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub restrictions: Option<String>,
    pub project_id: Option<String>,
    pub donor_id: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFundingSourceRequest {
    pub name: String,
    pub source_type: SourceType,
    pub amount: f64,
    pub currency: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub restrictions: Option<String>,
    pub project_id: Option<String>,
    pub donor_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFundingSourceRequest {
    pub name: Option<String>,
    pub source_type: Option<SourceType>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub restrictions: Option<String>,
    pub project_id: Option<String>,
    pub donor_id: Option<String>,
    pub notes: Option<String>,
    pub status: Option<FundingStatus>,
}

impl FundingSource {
    pub fn from_request(
        req: &CreateFundingSourceRequest,
        id: String,
        default_currency: &str,
        now: &str,
    ) -> Self {
        Self {
            id,
            name: req.name.clone(),
            source_type: req.source_type.as_str().to_string(),
            amount: req.amount,
            currency: req
                .currency
                .clone()
                .unwrap_or_else(|| default_currency.to_string()),
            start_date: req.start_date.as_deref().map(super::normalize_timestamp),
            end_date: req.end_date.as_deref().map(super::normalize_timestamp),
            restrictions: req.restrictions.clone(),
            project_id: req.project_id.clone(),
            donor_id: req.donor_id.clone(),
            notes: req.notes.clone(),
            status: FundingStatus::Active.as_str().to_string(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    pub async fn find<'e, E: SqliteExecutor<'e>>(
        db: E,
        id: &str,
    ) -> Result<Option<FundingSource>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM funding_sources WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Active sources, newest first
    pub async fn list_active<'e, E: SqliteExecutor<'e>>(
        db: E,
    ) -> Result<Vec<FundingSource>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM funding_sources WHERE status = ? ORDER BY created_at DESC",
        )
        .bind(FundingStatus::Active.as_str())
        .fetch_all(db)
        .await
    }

    pub async fn insert<'e, E: SqliteExecutor<'e>>(&self, db: E) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO funding_sources (
                id, name, source_type, amount, currency, start_date, end_date,
                restrictions, project_id, donor_id, notes, status,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.id)
        .bind(&self.name)
        .bind(&self.source_type)
        .bind(self.amount)
        .bind(&self.currency)
        .bind(&self.start_date)
        .bind(&self.end_date)
        .bind(&self.restrictions)
        .bind(&self.project_id)
        .bind(&self.donor_id)
        .bind(&self.notes)
        .bind(&self.status)
        .bind(&self.created_at)
        .bind(&self.updated_at)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Apply a partial update. Returns false when no source has this id.
    pub async fn update<'e, E: SqliteExecutor<'e>>(
        db: E,
        id: &str,
        req: &UpdateFundingSourceRequest,
        now: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE funding_sources SET
                name = COALESCE(?, name),
                source_type = COALESCE(?, source_type),
                amount = COALESCE(?, amount),
                currency = COALESCE(?, currency),
                start_date = COALESCE(?, start_date),
                end_date = COALESCE(?, end_date),
                restrictions = COALESCE(?, restrictions),
                project_id = COALESCE(?, project_id),
                donor_id = COALESCE(?, donor_id),
                notes = COALESCE(?, notes),
                status = COALESCE(?, status),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.name)
        .bind(req.source_type.map(|t| t.as_str()))
        .bind(req.amount)
        .bind(&req.currency)
        .bind(req.start_date.as_deref().map(super::normalize_timestamp))
        .bind(req.end_date.as_deref().map(super::normalize_timestamp))
        .bind(&req.restrictions)
        .bind(&req.project_id)
        .bind(&req.donor_id)
        .bind(&req.notes)
        .bind(req.status.map(|s| s.as_str()))
        .bind(now)
        .bind(id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns false when no source has this id.
    pub async fn set_status<'e, E: SqliteExecutor<'e>>(
        db: E,
        id: &str,
        status: FundingStatus,
        now: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE funding_sources SET status = ?, updated_at = ? WHERE id = ?")
                .bind(status.as_str())
                .bind(now)
                .bind(id)
                .execute(db)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
