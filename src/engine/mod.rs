//! Grant business rules: reporting schedules, balance math and compliance.
//!
//! Everything here is synchronous and storage-free; handlers fetch rows,
//! pass them in with the current time, and serialize what comes back.

pub mod compliance;
pub mod ledger;
pub mod reporting;

pub use compliance::{evaluate, summarize, ComplianceStatus, ComplianceSummary, GrantCompliance};
pub use ledger::{
    check_expenditure, group_by_source_type, group_by_status, sum_by_category, totals,
    GrantBalance, GrantTotals, GrantWithBalance, GrantsByStatus, LedgerError, SourceTypeTotal,
};
pub use reporting::generate_schedule;
