//! Reporting compliance for active grants.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{parse_timestamp, Grant, GrantReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    AttentionNeeded,
    NonCompliant,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrantCompliance {
    pub grant_id: String,
    pub grant_name: String,
    pub grantor: String,
    pub end_date: String,
    pub reporting_frequency: Option<String>,
    pub total_reports: usize,
    pub submitted_reports: usize,
    pub overdue_reports: usize,
    pub upcoming_reports: usize,
    pub compliance_status: ComplianceStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplianceSummary {
    pub total_grants: usize,
    pub compliant: usize,
    pub attention_needed: usize,
    pub non_compliant: usize,
}

/// Classify one grant's reports at `now`.
///
/// Any unsubmitted report past due makes the grant non-compliant; otherwise
/// any unsubmitted report due within `upcoming_window` needs attention.
pub fn evaluate(
    grant: &Grant,
    reports: &[GrantReport],
    now: DateTime<Utc>,
    upcoming_window: Duration,
) -> GrantCompliance {
    let horizon = now + upcoming_window;

    let mut submitted = 0;
    let mut overdue = 0;
    let mut upcoming = 0;

    for report in reports {
        if report.is_submitted() {
            submitted += 1;
            continue;
        }
        let Some(due) = parse_timestamp(&report.due_date) else {
            continue;
        };
        if due < now {
            overdue += 1;
        } else if due <= horizon {
            upcoming += 1;
        }
    }

    let compliance_status = if overdue > 0 {
        ComplianceStatus::NonCompliant
    } else if upcoming > 0 {
        ComplianceStatus::AttentionNeeded
    } else {
        ComplianceStatus::Compliant
    };

    GrantCompliance {
        grant_id: grant.id.clone(),
        grant_name: grant.name.clone(),
        grantor: grant.grantor.clone(),
        end_date: grant.end_date.clone(),
        reporting_frequency: grant.reporting_frequency.clone(),
        total_reports: reports.len(),
        submitted_reports: submitted,
        overdue_reports: overdue,
        upcoming_reports: upcoming,
        compliance_status,
    }
}

pub fn summarize(entries: &[GrantCompliance]) -> ComplianceSummary {
    let count = |status| {
        entries
            .iter()
            .filter(|c| c.compliance_status == status)
            .count()
    };

    ComplianceSummary {
        total_grants: entries.len(),
        compliant: count(ComplianceStatus::Compliant),
        attention_needed: count(ComplianceStatus::AttentionNeeded),
        non_compliant: count(ComplianceStatus::NonCompliant),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn grant() -> Grant {
        Grant {
            id: "g-1".into(),
            name: "Stage Lighting Upgrade".into(),
            grantor: "State Arts Board".into(),
            grantor_type: "state".into(),
            grant_number: None,
            amount_awarded: 10_000.0,
            amount_received: 0.0,
            currency: "USD".into(),
            start_date: "2025-01-01T00:00:00.000Z".into(),
            end_date: "2025-12-31T00:00:00.000Z".into(),
            purpose: "Lighting".into(),
            restrictions: None,
            reporting_requirements: None,
            reporting_frequency: Some("quarterly".into()),
            project_id: None,
            contact_name: None,
            contact_email: None,
            notes: None,
            status: "active".into(),
            created_at: "2025-01-01T00:00:00.000Z".into(),
            updated_at: "2025-01-01T00:00:00.000Z".into(),
        }
    }

    fn report(due: &str, status: &str) -> GrantReport {
        GrantReport {
            id: format!("r-{}", due),
            grant_id: "g-1".into(),
            report_type: "progress".into(),
            report_number: None,
            due_date: due.into(),
            submitted_date: None,
            status: status.into(),
            report_content: None,
            attachments: None,
            created_at: "2025-01-01T00:00:00.000Z".into(),
            updated_at: "2025-01-01T00:00:00.000Z".into(),
        }
    }

    fn window() -> Duration {
        Duration::days(30)
    }

    #[test]
    fn test_overdue_is_non_compliant() {
        let reports = vec![
            report("2025-04-01T00:00:00.000Z", "pending"),
            report("2025-06-10T00:00:00.000Z", "pending"),
        ];
        let c = evaluate(&grant(), &reports, now(), window());

        assert_eq!(c.overdue_reports, 1);
        assert_eq!(c.upcoming_reports, 1);
        assert_eq!(c.compliance_status, ComplianceStatus::NonCompliant);
    }

    #[test]
    fn test_upcoming_needs_attention() {
        let reports = vec![
            report("2025-04-01T00:00:00.000Z", "submitted"),
            report("2025-07-01T00:00:00.000Z", "pending"),
        ];
        let c = evaluate(&grant(), &reports, now(), window());

        assert_eq!(c.submitted_reports, 1);
        assert_eq!(c.overdue_reports, 0);
        assert_eq!(c.upcoming_reports, 1);
        assert_eq!(c.compliance_status, ComplianceStatus::AttentionNeeded);
    }

    #[test]
    fn test_far_future_is_compliant() {
        let reports = vec![report("2025-09-01T00:00:00.000Z", "pending")];
        let c = evaluate(&grant(), &reports, now(), window());

        assert_eq!(c.total_reports, 1);
        assert_eq!(c.compliance_status, ComplianceStatus::Compliant);
    }

    #[test]
    fn test_no_reports_is_compliant() {
        let c = evaluate(&grant(), &[], now(), window());
        assert_eq!(c.compliance_status, ComplianceStatus::Compliant);
        assert_eq!(c.reporting_frequency.as_deref(), Some("quarterly"));
    }

    #[test]
    fn test_summary_counts() {
        let g = grant();
        let entries = vec![
            evaluate(&g, &[], now(), window()),
            evaluate(&g, &[report("2025-06-15T00:00:00.000Z", "pending")], now(), window()),
            evaluate(&g, &[report("2025-05-15T00:00:00.000Z", "pending")], now(), window()),
            evaluate(&g, &[report("2025-05-15T00:00:00.000Z", "submitted")], now(), window()),
        ];

        assert_eq!(
            summarize(&entries),
            ComplianceSummary {
                total_grants: 4,
                compliant: 2,
                attention_needed: 1,
                non_compliant: 1,
            }
        );
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ComplianceStatus::AttentionNeeded).unwrap(),
            "\"attention_needed\""
        );
    }
}
