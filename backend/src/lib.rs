//! # Alloggi Backend
//!
//! Booking backend for holiday rentals: listings, their photos and
//! reservations, with date-overlap availability checks, a reservation
//! status workflow and derived pricing, served as a REST API.
//!
//! ## Architecture
//!
//! - [`models`]: Domain types (listings, photos, reservations, date ranges)
//! - [`services`]: Storage-independent rules (availability, pricing,
//!   validation, notifications)
//! - [`db`]: Repository traits, the Postgres and in-memory backends, and the
//!   orchestration in [`db::services`]
//! - [`config`]: Server settings from the environment
//! - [`http`]: Axum router, handlers and DTOs

// Allow large error types - RepositoryError carries rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
