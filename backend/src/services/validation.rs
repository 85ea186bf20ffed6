//! Input validation and normalization rules.
//!
//! Declarative per-field rules come from the `validator` derives on the input
//! models. The rules here cover normalization (names, emails, phones,
//! descriptions) and the checks a derive cannot express. Every violation is
//! collected into a [`FieldErrors`] map so a client sees all problems at once.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use validator::Validate;

use crate::models::{ListingInput, PhotoInput, PhotoSource, ReservationRequest};

/// Highest nightly price a listing may carry.
pub const MAX_NIGHTLY_PRICE: i64 = 10_000;
/// Maximum length of a single amenity label.
pub const MAX_AMENITY_LEN: usize = 100;
/// Minimum number of digits in a phone number after cleanup.
pub const MIN_PHONE_LEN: usize = 10;
/// Maximum number of characters in a phone number after cleanup.
pub const MAX_PHONE_LEN: usize = 20;

/// Field name to violation messages, ordered by field for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for a single violation.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when no violation was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({}).", error.code));
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// Run the derived `validator` rules and fold them into `errors`.
fn collect_derived<T: Validate>(input: &T, errors: &mut FieldErrors) {
    if let Err(e) = input.validate() {
        errors.merge(e.into());
    }
}

fn script_tags() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script.*?</script>|<iframe.*?</iframe>").expect("static regex")
    })
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove embedded `<script>` and `<iframe>` blocks.
pub fn sanitize_description(value: &str) -> String {
    script_tags().replace_all(value, "").into_owned()
}

/// Trim and capitalize each word of a guest name.
pub fn normalize_guest_name(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Keep only digits and `+`; empty input becomes `None`.
pub fn normalize_phone(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    Some(
        value
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect(),
    )
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

// ==================== Listings ====================

/// Normalize a listing input in place of the raw request.
pub fn normalize_listing(input: ListingInput) -> ListingInput {
    ListingInput {
        name: collapse_whitespace(&input.name),
        description: sanitize_description(&input.description),
        location: input.location.trim().to_string(),
        amenities: input
            .amenities
            .iter()
            .map(|a| a.trim().to_string())
            .collect(),
        ..input
    }
}

pub fn validate_nightly_price(price: Decimal, errors: &mut FieldErrors) {
    if price <= Decimal::ZERO {
        errors.add("nightly_price", "Price must be greater than zero.");
    } else if price > Decimal::from(MAX_NIGHTLY_PRICE) {
        errors.add(
            "nightly_price",
            format!("Price cannot exceed {} per night.", MAX_NIGHTLY_PRICE),
        );
    }
    if price.normalize().scale() > 2 {
        errors.add("nightly_price", "Price cannot have more than 2 decimal places.");
    }
}

/// Validate an already-normalized listing input.
pub fn validate_listing(input: &ListingInput) -> FieldErrors {
    let mut errors = FieldErrors::new();
    collect_derived(input, &mut errors);

    if input.name.chars().any(|c| matches!(c, '<' | '>' | '"' | '\'' | '&')) {
        errors.add("name", "Name contains characters that are not allowed.");
    }

    validate_nightly_price(input.nightly_price, &mut errors);

    for amenity in &input.amenities {
        if amenity.is_empty() {
            errors.add("amenities", "Amenities cannot be empty strings.");
        } else if amenity.chars().count() > MAX_AMENITY_LEN {
            errors.add(
                "amenities",
                format!("Each amenity cannot exceed {} characters.", MAX_AMENITY_LEN),
            );
        }
    }

    errors
}

// ==================== Photos ====================

/// Accept only absolute http(s) URLs.
pub fn validate_photo_url(value: &str, errors: &mut FieldErrors) {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {}
        Ok(_) => errors.add("url", "URL must use http or https."),
        Err(_) => errors.add("url", "Invalid URL."),
    }
}

/// Resolve the exclusive image/url pair into a [`PhotoSource`].
pub fn resolve_photo_source(
    image: Option<String>,
    url: Option<String>,
) -> Result<PhotoSource, FieldErrors> {
    match (non_blank(image), non_blank(url)) {
        (Some(_), Some(_)) => Err(FieldErrors::single(
            "non_field_errors",
            "Provide either an image or a URL, not both.",
        )),
        (None, None) => Err(FieldErrors::single(
            "non_field_errors",
            "An image or a URL is required.",
        )),
        (Some(image), None) => Ok(PhotoSource::Image(image)),
        (None, Some(url)) => {
            let mut errors = FieldErrors::new();
            validate_photo_url(&url, &mut errors);
            errors.into_result().map(|_| PhotoSource::Url(url))
        }
    }
}

/// Validate a photo input, returning its resolved source.
pub fn validate_photo(input: &PhotoInput) -> Result<PhotoSource, FieldErrors> {
    let mut errors = FieldErrors::new();
    collect_derived(input, &mut errors);

    match resolve_photo_source(input.image.clone(), input.url.clone()) {
        Ok(source) => errors.into_result().map(|_| source),
        Err(source_errors) => {
            errors.merge(source_errors);
            Err(errors)
        }
    }
}

// ==================== Reservations ====================

/// Normalize guest contact details.
pub fn normalize_reservation(request: ReservationRequest) -> ReservationRequest {
    ReservationRequest {
        guest_name: normalize_guest_name(&request.guest_name),
        guest_email: normalize_email(&request.guest_email),
        guest_phone: normalize_phone(request.guest_phone.as_deref()),
        guest_notes: non_blank(request.guest_notes),
        ..request
    }
}

pub fn validate_phone(phone: Option<&str>, errors: &mut FieldErrors) {
    if let Some(phone) = phone {
        if phone.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_LEN {
            errors.add(
                "guest_phone",
                format!("Phone number must contain at least {} digits.", MIN_PHONE_LEN),
            );
        }
        if phone.chars().count() > MAX_PHONE_LEN {
            errors.add(
                "guest_phone",
                format!("Phone number cannot exceed {} characters.", MAX_PHONE_LEN),
            );
        }
    }
}

/// Validate contact fields of an already-normalized reservation request.
///
/// Date, capacity and availability rules need the listing and are checked by
/// the booking service.
pub fn validate_reservation_fields(request: &ReservationRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();
    collect_derived(request, &mut errors);
    validate_phone(request.guest_phone.as_deref(), &mut errors);
    errors
}
