//! Grant models and queries.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};

/// Who awarded a grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantorType {
    Federal,
    State,
    Local,
    Foundation,
    Corporate,
    Individual,
    Other,
}

impl GrantorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantorType::Federal => "federal",
            GrantorType::State => "state",
            GrantorType::Local => "local",
            GrantorType::Foundation => "foundation",
            GrantorType::Corporate => "corporate",
            GrantorType::Individual => "individual",
            GrantorType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantStatus {
    Active,
    Pending,
    Closed,
}

impl GrantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantStatus::Active => "active",
            GrantStatus::Pending => "pending",
            GrantStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How often progress reports are owed to the grantor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportingFrequency {
    Monthly,
    #[default]
    Quarterly,
    SemiAnnual,
    Annual,
    FinalOnly,
}

impl ReportingFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportingFrequency::Monthly => "monthly",
            ReportingFrequency::Quarterly => "quarterly",
            ReportingFrequency::SemiAnnual => "semi_annual",
            ReportingFrequency::Annual => "annual",
            ReportingFrequency::FinalOnly => "final_only",
        }
    }

    /// Months between progress reports; zero means only a final report
    pub fn months_interval(&self) -> u32 {
        match self {
            ReportingFrequency::Monthly => 1,
            ReportingFrequency::Quarterly => 3,
            ReportingFrequency::SemiAnnual => 6,
            ReportingFrequency::Annual => 12,
            ReportingFrequency::FinalOnly => 0,
        }
    }
}

impl std::fmt::Display for ReportingFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReportingFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "semi_annual" => Ok(Self::SemiAnnual),
            "annual" => Ok(Self::Annual),
            "final_only" => Ok(Self::FinalOnly),
            _ => Err(format!("Unknown reporting frequency: {}", s)),
        }
    }
}

/// Unknown values fall back to quarterly reporting.
impl From<&str> for ReportingFrequency {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Grant {
    pub id: String,
    pub name: String,
    pub grantor: String,
    pub grantor_type: String,
    pub grant_number: Option<String>,
    pub amount_awarded: f64,
    pub amount_received: f64,
    pub currency: String,
    pub start_date: String,
    pub end_date: String,
    pub purpose: String,
    pub restrictions: Option<String>,
    pub reporting_requirements: Option<String>,
    pub reporting_frequency: Option<String>,
    pub project_id: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGrantRequest {
    pub name: String,
    pub grantor: String,
    pub grantor_type: GrantorType,
    pub grant_number: Option<String>,
    pub amount_awarded: f64,
    #[serde(default)]
    pub amount_received: f64,
    pub currency: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub purpose: String,
    pub restrictions: Option<String>,
    pub reporting_requirements: Option<String>,
    pub reporting_frequency: Option<ReportingFrequency>,
    pub project_id: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGrantRequest {
    pub name: Option<String>,
    pub grantor: Option<String>,
    pub grantor_type: Option<GrantorType>,
    pub grant_number: Option<String>,
    pub amount_awarded: Option<f64>,
    pub amount_received: Option<f64>,
    pub currency: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub purpose: Option<String>,
    pub restrictions: Option<String>,
    pub reporting_requirements: Option<String>,
    pub reporting_frequency: Option<ReportingFrequency>,
    pub project_id: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub notes: Option<String>,
    pub status: Option<GrantStatus>,
}

impl Grant {
    /// Build a new active grant row from a validated request
    pub fn from_request(
        req: &CreateGrantRequest,
        id: String,
        default_currency: &str,
        now: &str,
    ) -> Self {
        Self {
            id,
            name: req.name.clone(),
            grantor: req.grantor.clone(),
            grantor_type: req.grantor_type.as_str().to_string(),
            grant_number: req.grant_number.clone(),
            amount_awarded: req.amount_awarded,
            amount_received: req.amount_received,
            currency: req
                .currency
                .clone()
                .unwrap_or_else(|| default_currency.to_string()),
            start_date: super::normalize_timestamp(&req.start_date),
            end_date: super::normalize_timestamp(&req.end_date),
            purpose: req.purpose.clone(),
            restrictions: req.restrictions.clone(),
            reporting_requirements: req.reporting_requirements.clone(),
            reporting_frequency: req.reporting_frequency.map(|f| f.as_str().to_string()),
            project_id: req.project_id.clone(),
            contact_name: req.contact_name.clone(),
            contact_email: req.contact_email.clone(),
            notes: req.notes.clone(),
            status: GrantStatus::Active.as_str().to_string(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// Stored frequency, if the grant has a reporting schedule
    pub fn frequency(&self) -> Option<ReportingFrequency> {
        self.reporting_frequency
            .as_deref()
            .map(ReportingFrequency::from)
    }

    pub async fn find<'e, E: SqliteExecutor<'e>>(
        db: E,
        id: &str,
    ) -> Result<Option<Grant>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM grants WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// List grants ordered by end date, soonest first
    pub async fn list<'e, E: SqliteExecutor<'e>>(
        db: E,
        status: Option<&str>,
    ) -> Result<Vec<Grant>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as("SELECT * FROM grants WHERE status = ? ORDER BY end_date ASC")
                    .bind(status)
                    .fetch_all(db)
                    .await
            }
            None => {
                sqlx::query_as("SELECT * FROM grants ORDER BY end_date ASC")
                    .fetch_all(db)
                    .await
            }
        }
    }

    pub async fn insert<'e, E: SqliteExecutor<'e>>(&self, db: E) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO grants (
                id, name, grantor, grantor_type, grant_number, amount_awarded,
                amount_received, currency, start_date, end_date, purpose,
                restrictions, reporting_requirements, reporting_frequency,
                project_id, contact_name, contact_email, notes, status,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.id)
        .bind(&self.name)
        .bind(&self.grantor)
        .bind(&self.grantor_type)
        .bind(&self.grant_number)
        .bind(self.amount_awarded)
        .bind(self.amount_received)
        .bind(&self.currency)
        .bind(&self.start_date)
        .bind(&self.end_date)
        .bind(&self.purpose)
        .bind(&self.restrictions)
        .bind(&self.reporting_requirements)
        .bind(&self.reporting_frequency)
        .bind(&self.project_id)
        .bind(&self.contact_name)
        .bind(&self.contact_email)
        .bind(&self.notes)
        .bind(&self.status)
        .bind(&self.created_at)
        .bind(&self.updated_at)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Apply a partial update. Returns false when no grant has this id.
    pub async fn update<'e, E: SqliteExecutor<'e>>(
        db: E,
        id: &str,
        req: &UpdateGrantRequest,
        now: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE grants SET
                name = COALESCE(?, name),
                grantor = COALESCE(?, grantor),
                grantor_type = COALESCE(?, grantor_type),
                grant_number = COALESCE(?, grant_number),
                amount_awarded = COALESCE(?, amount_awarded),
                amount_received = COALESCE(?, amount_received),
                currency = COALESCE(?, currency),
                start_date = COALESCE(?, start_date),
                end_date = COALESCE(?, end_date),
                purpose = COALESCE(?, purpose),
                restrictions = COALESCE(?, restrictions),
                reporting_requirements = COALESCE(?, reporting_requirements),
                reporting_frequency = COALESCE(?, reporting_frequency),
                project_id = COALESCE(?, project_id),
                contact_name = COALESCE(?, contact_name),
                contact_email = COALESCE(?, contact_email),
                notes = COALESCE(?, notes),
                status = COALESCE(?, status),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.name)
        .bind(&req.grantor)
        .bind(req.grantor_type.map(|t| t.as_str()))
        .bind(&req.grant_number)
        .bind(req.amount_awarded)
        .bind(req.amount_received)
        .bind(&req.currency)
        .bind(req.start_date.as_deref().map(super::normalize_timestamp))
        .bind(req.end_date.as_deref().map(super::normalize_timestamp))
        .bind(&req.purpose)
        .bind(&req.restrictions)
        .bind(&req.reporting_requirements)
        .bind(req.reporting_frequency.map(|f| f.as_str()))
        .bind(&req.project_id)
        .bind(&req.contact_name)
        .bind(&req.contact_email)
        .bind(&req.notes)
        .bind(req.status.map(|s| s.as_str()))
        .bind(now)
        .bind(id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Move a grant to a new status. Returns false when no grant has this id.
    pub async fn set_status<'e, E: SqliteExecutor<'e>>(
        db: E,
        id: &str,
        status: GrantStatus,
        now: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE grants SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now)
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the running total of funds received
    pub async fn set_amount_received<'e, E: SqliteExecutor<'e>>(
        db: E,
        id: &str,
        amount_received: f64,
        now: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE grants SET amount_received = ?, updated_at = ? WHERE id = ?")
            .bind(amount_received)
            .bind(now)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
