//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use alloggi_backend::models::{ListingId, ListingInput, ReservationRequest};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Variables are restored on unwind, and access is serialized because the
/// process environment is shared by tests running in parallel.
///
/// `Some(v)` sets a variable, `None` removes it.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// ==================== Fixtures ====================

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A fixed "today" well before every fixture stay.
pub fn today() -> NaiveDate {
    date(2025, 1, 15)
}

pub fn money(value: &str) -> Decimal {
    value.parse().unwrap()
}

pub fn listing_input(name: &str, nightly_price: &str) -> ListingInput {
    ListingInput {
        name: name.to_string(),
        description: "Bright flat close to the sea.".to_string(),
        location: "Positano".to_string(),
        nightly_price: money(nightly_price),
        max_guests: 4,
        rooms: 2,
        bathrooms: 1,
        amenities: vec!["wifi".to_string(), "aria condizionata".to_string()],
        available: true,
    }
}

pub fn reservation_request(
    listing_id: ListingId,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> ReservationRequest {
    ReservationRequest {
        listing_id,
        check_in,
        check_out,
        guests: 2,
        guest_name: "mario rossi".to_string(),
        guest_email: "Mario.Rossi@Example.com".to_string(),
        guest_phone: Some("+39 333 123 4567".to_string()),
        guest_notes: None,
    }
}
