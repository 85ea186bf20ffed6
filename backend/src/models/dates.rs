//! Half-open date ranges used for stays.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stay expressed as the half-open interval `[check_in, check_out)`.
///
/// The check-out day is free for the next guest, so two stays where one
/// checks out on the day the other checks in do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl DateRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            check_in,
            check_out,
        }
    }

    /// Number of nights between check-in and check-out (negative if reversed).
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// True when check-out is strictly after check-in.
    pub fn is_well_formed(&self) -> bool {
        self.check_out > self.check_in
    }

    /// Half-open overlap test: `[a, b)` and `[c, d)` overlap iff `a < d && c < b`.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.check_in, self.check_out)
    }
}
