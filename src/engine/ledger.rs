//! Grant balance arithmetic and funding roll-ups.
//!
//! All of this runs in memory over rows already fetched for a request.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::db::{parse_timestamp, FundingSource, Grant, GrantExpenditure, GrantStatus};

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Expenditure exceeds remaining grant balance of {remaining}")]
    ExceedsBalance { remaining: f64 },
}

/// Check that `amount` fits in what is left of the award.
///
/// Returns the balance that remains once the expenditure is recorded.
pub fn check_expenditure(awarded: f64, spent: f64, amount: f64) -> Result<f64, LedgerError> {
    let remaining = awarded - spent;
    if amount > remaining {
        return Err(LedgerError::ExceedsBalance { remaining });
    }
    Ok(remaining - amount)
}

/// Derived spend and timing figures for one grant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrantBalance {
    pub total_spent: f64,
    pub remaining_balance: f64,
    /// Percent of the award spent, two decimals
    pub utilization_rate: f64,
    pub days_remaining: i64,
    pub is_expiring: bool,
    pub is_expired: bool,
}

impl GrantBalance {
    pub fn compute(grant: &Grant, spent: f64, now: DateTime<Utc>, expiring_window_days: i64) -> Self {
        let utilization_rate = if grant.amount_awarded > 0.0 {
            round2(spent / grant.amount_awarded * 100.0)
        } else {
            0.0
        };

        let days_remaining = parse_timestamp(&grant.end_date)
            .map(|end| days_until(now, end))
            .unwrap_or(0);

        Self {
            total_spent: spent,
            remaining_balance: grant.amount_awarded - spent,
            utilization_rate,
            days_remaining,
            is_expiring: days_remaining > 0 && days_remaining <= expiring_window_days,
            is_expired: days_remaining <= 0,
        }
    }
}

/// Whole days from `now` until `end`, rounded up
pub fn days_until(now: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - now).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY).ceil() as i64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A grant row with its balance figures flattened alongside
#[derive(Debug, Clone, Serialize)]
pub struct GrantWithBalance {
    #[serde(flatten)]
    pub grant: Grant,
    #[serde(flatten)]
    pub balance: GrantBalance,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GrantsByStatus {
    pub active: Vec<GrantWithBalance>,
    pub pending: Vec<GrantWithBalance>,
    pub closed: Vec<GrantWithBalance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GrantTotals {
    pub total_awarded: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
}

/// Bucket grants by lifecycle status; unknown statuses are left out
pub fn group_by_status(grants: &[GrantWithBalance]) -> GrantsByStatus {
    let mut groups = GrantsByStatus::default();
    for g in grants {
        let bucket = match g.grant.status.as_str() {
            s if s == GrantStatus::Active.as_str() => &mut groups.active,
            s if s == GrantStatus::Pending.as_str() => &mut groups.pending,
            s if s == GrantStatus::Closed.as_str() => &mut groups.closed,
            _ => continue,
        };
        bucket.push(g.clone());
    }
    groups
}

pub fn totals(grants: &[GrantWithBalance]) -> GrantTotals {
    grants.iter().fold(GrantTotals::default(), |mut acc, g| {
        acc.total_awarded += g.grant.amount_awarded;
        acc.total_spent += g.balance.total_spent;
        acc.total_remaining += g.balance.remaining_balance;
        acc
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceTypeTotal {
    pub count: i64,
    pub total: f64,
}

pub fn group_by_source_type(sources: &[FundingSource]) -> BTreeMap<String, SourceTypeTotal> {
    let mut by_type: BTreeMap<String, SourceTypeTotal> = BTreeMap::new();
    for s in sources {
        let entry = by_type.entry(s.source_type.clone()).or_default();
        entry.count += 1;
        entry.total += s.amount;
    }
    by_type
}

pub fn sum_by_category(expenditures: &[GrantExpenditure]) -> BTreeMap<String, f64> {
    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();
    for e in expenditures {
        *by_category.entry(e.category.clone()).or_default() += e.amount;
    }
    by_category
}
