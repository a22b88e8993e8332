//! Reporting schedule generation.
//!
//! A grant with a reporting frequency owes one progress report per interval
//! between its start and end dates, plus a final report some days after it
//! ends. `final_only` grants owe just the final report, due on the end date.

use chrono::{DateTime, Duration, Months, Utc};

use crate::db::{NewGrantReport, ReportStatus, ReportType, ReportingFrequency};

/// Build the pending report stubs for a grant.
///
/// The n-th progress report is due `n * interval` months after `start`;
/// a due date falling exactly on `end` is still included. Month overflow
/// clamps to the last day of the month (Jan 31 + 1 month = Feb 28/29).
pub fn generate_schedule(
    grant_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    frequency: ReportingFrequency,
    final_report_offset: Duration,
) -> Vec<NewGrantReport> {
    let interval = frequency.months_interval();

    if interval == 0 {
        return vec![stub(grant_id, ReportType::Final, None, end)];
    }

    let mut reports = Vec::new();
    let mut number: u32 = 1;
    while let Some(due) = number
        .checked_mul(interval)
        .and_then(|months| start.checked_add_months(Months::new(months)))
    {
        if due > end {
            break;
        }
        reports.push(stub(
            grant_id,
            ReportType::Progress,
            Some(i64::from(number)),
            due,
        ));
        number += 1;
    }

    reports.push(stub(
        grant_id,
        ReportType::Final,
        None,
        end + final_report_offset,
    ));

    reports
}

fn stub(
    grant_id: &str,
    report_type: ReportType,
    report_number: Option<i64>,
    due_date: DateTime<Utc>,
) -> NewGrantReport {
    NewGrantReport {
        grant_id: grant_id.to_string(),
        report_type,
        report_number,
        due_date,
        status: ReportStatus::Pending,
    }
}
