//! Grant report models and queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Progress,
    Final,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Progress => "progress",
            ReportType::Final => "final",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Submitted,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Submitted => "submitted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GrantReport {
    pub id: String,
    pub grant_id: String,
    pub report_type: String,
    pub report_number: Option<i64>,
    pub due_date: String,
    pub submitted_date: Option<String>,
    pub status: String,
    pub report_content: Option<String>,
    /// JSON-encoded attachment list
    pub attachments: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Report as returned by the API, with attachments decoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantReportResponse {
    pub id: String,
    pub grant_id: String,
    pub report_type: String,
    pub report_number: Option<i64>,
    pub due_date: String,
    pub submitted_date: Option<String>,
    pub status: String,
    pub report_content: Option<String>,
    pub attachments: Option<serde_json::Value>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GrantReport> for GrantReportResponse {
    fn from(report: GrantReport) -> Self {
        Self {
            attachments: report
                .attachments
                .as_deref()
                .and_then(|a| serde_json::from_str(a).ok()),
            id: report.id,
            grant_id: report.grant_id,
            report_type: report.report_type,
            report_number: report.report_number,
            due_date: report.due_date,
            submitted_date: report.submitted_date,
            status: report.status,
            report_content: report.report_content,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

/// A report stub produced by the schedule generator, not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewGrantReport {
    pub grant_id: String,
    pub report_type: ReportType,
    pub report_number: Option<i64>,
    pub due_date: DateTime<Utc>,
    pub status: ReportStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReportRequest {
    pub report_id: String,
    pub report_content: Option<String>,
    pub attachments: Option<serde_json::Value>,
}

impl GrantReport {
    pub fn is_submitted(&self) -> bool {
        self.status == ReportStatus::Submitted.as_str()
    }

    pub async fn find<'e, E: SqliteExecutor<'e>>(
        db: E,
        id: &str,
    ) -> Result<Option<GrantReport>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM grant_reports WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Reports of one grant, earliest due first
    pub async fn list_for_grant<'e, E: SqliteExecutor<'e>>(
        db: E,
        grant_id: &str,
    ) -> Result<Vec<GrantReport>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM grant_reports WHERE grant_id = ? ORDER BY due_date ASC")
            .bind(grant_id)
            .fetch_all(db)
            .await
    }

    /// Reports belonging to grants with the given status
    pub async fn list_for_grant_status<'e, E: SqliteExecutor<'e>>(
        db: E,
        grant_status: &str,
    ) -> Result<Vec<GrantReport>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT r.* FROM grant_reports r
            JOIN grants g ON g.id = r.grant_id
            WHERE g.status = ?
            ORDER BY r.due_date ASC
            "#,
        )
        .bind(grant_status)
        .fetch_all(db)
        .await
    }

    /// Persist a generated schedule
    pub async fn insert_batch(
        conn: &mut SqliteConnection,
        reports: &[NewGrantReport],
        now: &str,
    ) -> Result<usize, sqlx::Error> {
        for report in reports {
            sqlx::query(
                r#"
                INSERT INTO grant_reports (
                    id, grant_id, report_type, report_number, due_date,
                    status, created_at, updated_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&report.grant_id)
            .bind(report.report_type.as_str())
            .bind(report.report_number)
            .bind(super::format_timestamp(&report.due_date))
            .bind(report.status.as_str())
            .bind(now)
            .bind(now)
            .execute(&mut *conn)
            .await?;
        }
        Ok(reports.len())
    }

    /// Mark a report submitted. Returns false when no report has this id.
    pub async fn submit<'e, E: SqliteExecutor<'e>>(
        db: E,
        req: &SubmitReportRequest,
        now: &str,
    ) -> Result<bool, sqlx::Error> {
        let attachments = req
            .attachments
            .as_ref()
            .map(|a| a.to_string());

        let result = sqlx::query(
            r#"
            UPDATE grant_reports SET
                status = ?,
                submitted_date = ?,
                report_content = ?,
                attachments = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(ReportStatus::Submitted.as_str())
        .bind(now)
        .bind(&req.report_content)
        .bind(attachments)
        .bind(now)
        .bind(&req.report_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(attachments: Option<&str>) -> GrantReport {
        GrantReport {
            id: "r-1".into(),
            grant_id: "g-1".into(),
            report_type: "progress".into(),
            report_number: Some(1),
            due_date: "2025-02-01T00:00:00.000Z".into(),
            submitted_date: None,
            status: "pending".into(),
            report_content: None,
            attachments: attachments.map(String::from),
            created_at: "2025-01-01T00:00:00.000Z".into(),
            updated_at: "2025-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn test_response_decodes_attachments() {
        let resp = GrantReportResponse::from(report(Some(r#"["budget.pdf"]"#)));
        assert_eq!(resp.attachments, Some(serde_json::json!(["budget.pdf"])));

        let resp = GrantReportResponse::from(report(None));
        assert!(resp.attachments.is_none());
    }

    #[test]
    fn test_is_submitted() {
        let mut r = report(None);
        assert!(!r.is_submitted());
        r.status = "submitted".into();
        assert!(r.is_submitted());
    }
}
