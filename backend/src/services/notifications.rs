//! Guest notifications on reservation status changes.
//!
//! Delivery is fire-and-forget: a failing notifier never fails the status
//! change that triggered it.

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{ListingId, Reservation, ReservationId, ReservationStatus};

/// Payload sent when a reservation enters a guest-visible state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotification {
    pub reservation_id: ReservationId,
    pub listing_id: ListingId,
    pub listing_name: String,
    pub guest_name: String,
    pub guest_email: String,
    pub previous: ReservationStatus,
    pub status: ReservationStatus,
}

impl StatusNotification {
    pub fn new(reservation: &Reservation, listing_name: &str, previous: ReservationStatus) -> Self {
        Self {
            reservation_id: reservation.id,
            listing_id: reservation.listing_id,
            listing_name: listing_name.to_string(),
            guest_name: reservation.guest_name.clone(),
            guest_email: reservation.guest_email.clone(),
            previous,
            status: reservation.status,
        }
    }

    pub fn subject(&self) -> String {
        match self.status {
            ReservationStatus::Confirmed => {
                format!("Your reservation at {} is confirmed", self.listing_name)
            }
            ReservationStatus::Refused => {
                format!("Your reservation at {} was declined", self.listing_name)
            }
            other => format!(
                "Your reservation at {} is now {}",
                self.listing_name,
                other.label()
            ),
        }
    }
}

/// Outbound channel for guest notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &StatusNotification) -> anyhow::Result<()>;
}

/// Writes notifications to the log instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &StatusNotification) -> anyhow::Result<()> {
        log::info!(
            "Notify {} <{}>: {} (reservation {}, {} -> {})",
            notification.guest_name,
            notification.guest_email,
            notification.subject(),
            notification.reservation_id,
            notification.previous,
            notification.status
        );
        Ok(())
    }
}

/// Send `notification` in the background; failures are logged and dropped.
pub fn dispatch(notifier: Arc<dyn Notifier>, notification: StatusNotification) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&notification).await {
            log::warn!(
                "Failed to notify guest for reservation {}: {:#}",
                notification.reservation_id,
                e
            );
        }
    });
}
