//! Stay pricing: nights and total from dates and nightly rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validation::FieldErrors;
use crate::models::DateRange;

/// Shortest bookable stay, in nights.
pub const MIN_NIGHTS: i64 = 1;
/// Longest bookable stay, in nights.
pub const MAX_NIGHTS: i64 = 30;

/// Derived price of a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub nights: i32,
    pub total_price: Decimal,
}

/// `nights = (check_out - check_in).days`, `total = nights * nightly_price`.
///
/// Reversed ranges quote zero nights.
pub fn quote(stay: &DateRange, nightly_price: Decimal) -> Quote {
    let nights = stay.nights().max(0);
    Quote {
        nights: i32::try_from(nights).unwrap_or(i32::MAX),
        total_price: Decimal::from(nights) * nightly_price,
    }
}

/// Check the stay length is within `MIN_NIGHTS..=MAX_NIGHTS`.
pub fn validate_stay_length(stay: &DateRange, errors: &mut FieldErrors) {
    let nights = stay.nights();
    if !stay.is_well_formed() {
        // reported by the date checks
        return;
    }
    if nights < MIN_NIGHTS {
        errors.add(
            "check_out",
            format!("The stay must be at least {} night.", MIN_NIGHTS),
        );
    } else if nights > MAX_NIGHTS {
        errors.add(
            "check_out",
            format!("The stay cannot exceed {} nights.", MAX_NIGHTS),
        );
    }
}

pub fn validate_guest_count(guests: i32, max_guests: i32, errors: &mut FieldErrors) {
    if guests < 1 {
        errors.add("guests", "At least one guest is required.");
    } else if guests > max_guests {
        errors.add(
            "guests",
            format!(
                "The number of guests ({}) exceeds the maximum allowed for this listing ({}).",
                guests, max_guests
            ),
        );
    }
}
