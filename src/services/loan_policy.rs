//! Loan policy: overdue predicate and renewal-date window
//!
//! These are pure functions over dates. Callers supply `today` so the
//! policy never reads the clock itself.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Furthest a renewal may push the due date, counted from today
pub const MAX_RENEWAL_WEEKS: i64 = 4;

/// Renewal date proposed when the renewal form is first requested
pub const DEFAULT_RENEWAL_WEEKS: i64 = 3;

/// Reasons a proposed renewal date is refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalError {
    #[error("Invalid date - renewal in past")]
    PastDate,

    #[error("Invalid date - renewal more than 4 weeks ahead")]
    RangeExceeded,
}

impl RenewalError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            RenewalError::PastDate => "past_date",
            RenewalError::RangeExceeded => "range_exceeded",
        }
    }
}

/// Whether a copy counts as overdue.
///
/// Returns `false` only when a due date exists and today is strictly before
/// it. A copy without a due date is reported overdue.
pub fn is_overdue(due_back: Option<NaiveDate>, today: NaiveDate) -> bool {
    !matches!(due_back, Some(due) if today < due)
}

/// Check a proposed renewal date against the window `[today, today + 4 weeks]`.
///
/// The date is returned unchanged when accepted.
pub fn validate_renewal_date(proposed: NaiveDate, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
    if proposed < today {
        return Err(RenewalError::PastDate);
    }

    if proposed > today + Duration::weeks(MAX_RENEWAL_WEEKS) {
        return Err(RenewalError::RangeExceeded);
    }

    Ok(proposed)
}

/// Date offered on the renewal form before anything is submitted
pub fn default_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::weeks(DEFAULT_RENEWAL_WEEKS)
}
