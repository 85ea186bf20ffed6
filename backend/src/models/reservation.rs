//! Reservation entity and its lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::dates::DateRange;
use super::listing::ListingId;
use super::PageRequest;
use crate::define_id_type;

define_id_type!(i64, ReservationId);

/// Lifecycle state of a reservation.
///
/// ```text
/// PENDING ──► CONFIRMED ──► PAID ──► COMPLETED
///    │            │
///    ├──► REFUSED ◄┤
///    └──► CANCELLED ◄┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Paid,
    Completed,
    Cancelled,
    Refused,
}

impl ReservationStatus {
    /// States that block overlapping reservations on the same listing.
    pub const ACTIVE: [ReservationStatus; 3] = [Self::Pending, Self::Confirmed, Self::Paid];

    pub const ALL: [ReservationStatus; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Paid,
        Self::Completed,
        Self::Cancelled,
        Self::Refused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Paid => "PAID",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Refused => "REFUSED",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Paid => "Paid",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Refused => "Refused",
        }
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    /// Guest-facing edits are only allowed while pending or confirmed.
    pub fn is_modifiable(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub fn allowed_transitions(&self) -> &'static [ReservationStatus] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Refused, Self::Cancelled],
            Self::Confirmed => &[Self::Paid, Self::Refused, Self::Cancelled],
            Self::Paid => &[Self::Completed],
            Self::Completed | Self::Cancelled | Self::Refused => &[],
        }
    }

    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Whether entering this state notifies the guest.
    pub fn notifies_guest(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Refused)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown reservation status: {}", s))
    }
}

/// A stored reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub listing_id: ListingId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub guest_notes: Option<String>,
    pub internal_notes: Option<String>,
    pub status: ReservationStatus,
    pub nights: i32,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn stay(&self) -> DateRange {
        DateRange::new(self.check_in, self.check_out)
    }

    pub fn is_modifiable(&self) -> bool {
        self.status.is_modifiable()
    }

    /// Cancellable while modifiable and before the check-in day.
    pub fn is_cancellable(&self, today: NaiveDate) -> bool {
        self.is_modifiable() && self.check_in > today
    }
}

/// Validated, priced reservation ready to be stored in PENDING state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub listing_id: ListingId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub guest_notes: Option<String>,
    pub nights: i32,
    pub total_price: Decimal,
}

impl NewReservation {
    pub fn stay(&self) -> DateRange {
        DateRange::new(self.check_in, self.check_out)
    }
}

/// Reservation request as submitted by a guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ReservationRequest {
    pub listing_id: ListingId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(range(min = 1, message = "At least one guest is required."))]
    pub guests: i32,
    #[validate(length(min = 2, max = 255, message = "Guest name must contain at least 2 characters."))]
    pub guest_name: String,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Email address cannot exceed 254 characters.")
    )]
    pub guest_email: String,
    #[serde(default)]
    pub guest_phone: Option<String>,
    #[serde(default)]
    pub guest_notes: Option<String>,
}

impl ReservationRequest {
    pub fn stay(&self) -> DateRange {
        DateRange::new(self.check_in, self.check_out)
    }
}

/// Partial reservation update. Status is not writable here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationPatch {
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<i32>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_notes: Option<String>,
    pub internal_notes: Option<String>,
}

impl ReservationPatch {
    /// True when the patch moves the stay.
    pub fn changes_dates(&self, current: &Reservation) -> bool {
        self.check_in.is_some_and(|d| d != current.check_in)
            || self.check_out.is_some_and(|d| d != current.check_out)
    }

    /// Merge this patch over the stored reservation. Pricing is not recomputed here.
    pub fn apply(self, current: &Reservation) -> Reservation {
        Reservation {
            check_in: self.check_in.unwrap_or(current.check_in),
            check_out: self.check_out.unwrap_or(current.check_out),
            guests: self.guests.unwrap_or(current.guests),
            guest_name: self.guest_name.unwrap_or_else(|| current.guest_name.clone()),
            guest_email: self.guest_email.unwrap_or_else(|| current.guest_email.clone()),
            guest_phone: self.guest_phone.or_else(|| current.guest_phone.clone()),
            guest_notes: self.guest_notes.or_else(|| current.guest_notes.clone()),
            internal_notes: self.internal_notes.or_else(|| current.internal_notes.clone()),
            ..current.clone()
        }
    }
}

/// Filters for reservation queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    pub listing_id: Option<ListingId>,
    pub status: Option<ReservationStatus>,
    pub page: PageRequest,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReservationStatus::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn reservation(status: ReservationStatus, check_in: NaiveDate) -> Reservation {
        Reservation {
            id: ReservationId::new(1),
            listing_id: ListingId::new(1),
            check_in,
            check_out: check_in + chrono::Duration::days(2),
            guests: 2,
            guest_name: "Mario Rossi".to_string(),
            guest_email: "mario@example.com".to_string(),
            guest_phone: None,
            guest_notes: None,
            internal_notes: None,
            status,
            nights: 2,
            total_price: Decimal::from(200),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_transition_table() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Refused));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Paid));

        assert!(Confirmed.can_transition_to(Paid));
        assert!(Confirmed.can_transition_to(Refused));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Completed));

        assert!(Paid.can_transition_to(Completed));
        assert!(!Paid.can_transition_to(Cancelled));

        for terminal in [Completed, Cancelled, Refused] {
            assert!(terminal.is_terminal());
            for next in ReservationStatus::ALL {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_active_and_modifiable_sets() {
        let active: Vec<_> = ReservationStatus::ALL
            .into_iter()
            .filter(|s| s.is_active())
            .collect();
        assert_eq!(active, vec![Pending, Confirmed, Paid]);

        assert!(Pending.is_modifiable());
        assert!(Confirmed.is_modifiable());
        assert!(!Paid.is_modifiable());
        assert!(!Cancelled.is_modifiable());
    }

    #[test]
    fn test_status_serde_and_parse() {
        assert_eq!(serde_json::to_string(&Confirmed).unwrap(), "\"CONFIRMED\"");
        assert_eq!("paid".parse::<ReservationStatus>().unwrap(), Paid);
        assert!("ARCHIVED".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn test_is_cancellable_requires_future_check_in() {
        let today = d(2025, 5, 10);
        assert!(reservation(Pending, d(2025, 5, 11)).is_cancellable(today));
        assert!(!reservation(Pending, today).is_cancellable(today));
        assert!(!reservation(Paid, d(2025, 6, 1)).is_cancellable(today));
    }

    #[test]
    fn test_patch_detects_date_change() {
        let current = reservation(Pending, d(2025, 5, 11));
        let same = ReservationPatch {
            check_in: Some(current.check_in),
            ..Default::default()
        };
        assert!(!same.changes_dates(&current));

        let moved = ReservationPatch {
            check_out: Some(d(2025, 5, 20)),
            ..Default::default()
        };
        assert!(moved.changes_dates(&current));
        let merged = moved.apply(&current);
        assert_eq!(merged.check_out, d(2025, 5, 20));
        assert_eq!(merged.status, Pending);
    }
}
