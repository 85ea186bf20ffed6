//! Application state for the HTTP server.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::repository::FullRepository;
use crate::services::{LogNotifier, Notifier};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FullRepository>,
    /// Receives CONFIRMED/REFUSED status changes
    pub notifier: Arc<dyn Notifier>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// State with the logging notifier and default configuration.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            notifier: Arc::new(LogNotifier),
            config: Arc::new(ServerConfig::default()),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Current date used by the past-date and cancellation rules.
    pub fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}
