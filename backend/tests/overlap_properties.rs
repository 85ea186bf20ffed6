//! Property tests for the half-open overlap rule and the availability helpers.

mod support;

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use alloggi_backend::models::{
    DateRange, ListingId, Reservation, ReservationId, ReservationStatus,
};
use alloggi_backend::services::pricing::quote;
use alloggi_backend::services::{find_conflicts, is_available};

fn base() -> NaiveDate {
    support::date(2030, 1, 1)
}

fn range(start: i64, len: i64) -> DateRange {
    DateRange::new(base() + Duration::days(start), base() + Duration::days(start + len))
}

fn reservation(id: i64, listing: i64, stay: DateRange, status: ReservationStatus) -> Reservation {
    let quote = quote(&stay, Decimal::from(100));
    Reservation {
        id: ReservationId::new(id),
        listing_id: ListingId::new(listing),
        check_in: stay.check_in,
        check_out: stay.check_out,
        guests: 2,
        guest_name: "Guest".to_string(),
        guest_email: "guest@example.com".to_string(),
        guest_phone: None,
        guest_notes: None,
        internal_notes: None,
        status,
        nights: quote.nights,
        total_price: quote.total_price,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn status_strategy() -> impl Strategy<Value = ReservationStatus> {
    prop::sample::select(ReservationStatus::ALL.to_vec())
}

proptest! {
    #[test]
    fn overlap_is_symmetric(a in 0i64..60, la in 1i64..15, b in 0i64..60, lb in 1i64..15) {
        let x = range(a, la);
        let y = range(b, lb);
        prop_assert_eq!(x.overlaps(&y), y.overlaps(&x));
    }

    #[test]
    fn overlap_matches_shared_night(a in 0i64..60, la in 1i64..15, b in 0i64..60, lb in 1i64..15) {
        let x = range(a, la);
        let y = range(b, lb);
        let shares_night = (a..a + la).any(|night| (b..b + lb).contains(&night));
        prop_assert_eq!(x.overlaps(&y), shares_night);
    }

    #[test]
    fn back_to_back_stays_never_overlap(a in 0i64..60, la in 1i64..15, lb in 1i64..15) {
        let first = range(a, la);
        let second = range(a + la, lb);
        prop_assert!(!first.overlaps(&second));
    }

    #[test]
    fn quote_is_nights_times_price(start in 0i64..300, len in 1i64..31, cents in 1i64..1_000_000) {
        let price = Decimal::new(cents, 2);
        let q = quote(&range(start, len), price);
        prop_assert_eq!(i64::from(q.nights), len);
        prop_assert_eq!(q.total_price, Decimal::from(len) * price);
    }

    #[test]
    fn only_active_overlapping_reservations_conflict(
        existing in prop::collection::vec((0i64..40, 1i64..10, 1i64..3, status_strategy()), 0..12),
        start in 0i64..40,
        len in 1i64..10,
    ) {
        let listing = ListingId::new(1);
        let stay = range(start, len);
        let reservations: Vec<Reservation> = existing
            .iter()
            .enumerate()
            .map(|(i, (s, l, listing_id, status))| reservation(i as i64 + 1, *listing_id, range(*s, *l), *status))
            .collect();

        let conflicts = find_conflicts(&reservations, listing, &stay, None);
        let expected = reservations
            .iter()
            .filter(|r| r.listing_id == listing && r.status.is_active() && r.stay().overlaps(&stay))
            .count();

        prop_assert_eq!(conflicts.len(), expected);
        prop_assert_eq!(is_available(&reservations, listing, &stay, None), expected == 0);
    }

    #[test]
    fn a_reservation_never_conflicts_with_itself(start in 0i64..40, len in 1i64..10) {
        let stay = range(start, len);
        let own = reservation(7, 1, stay, ReservationStatus::Confirmed);
        let existing = vec![own];

        prop_assert!(!is_available(&existing, ListingId::new(1), &stay, None));
        prop_assert!(is_available(&existing, ListingId::new(1), &stay, Some(ReservationId::new(7))));
    }
}
