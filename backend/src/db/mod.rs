//! Persistence and booking orchestration.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP API (crate::http)                                 │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  validation, pricing, availability, status changes      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/)                        │
//! └───────────────────┬─────────────────────────────────────┘
//!           ┌─────────┴──────────┐
//!   ┌───────▼───────┐    ┌───────▼───────┐
//!   │   Postgres    │    │    Local      │
//!   │   (Diesel)    │    │  (in-memory)  │
//!   └───────────────┘    └───────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use alloggi_backend::db::{services, RepositoryFactory};
//! use alloggi_backend::models::ListingFilter;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let page = services::list_listings(repo.as_ref(), &ListingFilter::default()).await?;
//!     println!("{} listings", page.total);
//!     Ok(())
//! }
//! ```

// When both backends are compiled in, REPOSITORY_TYPE / DATABASE_URL decide at runtime.
#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::{PoolStats, PostgresConfig};
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    _private: (),
}

pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    ErrorContext, FullRepository, ListingRepository, PhotoRepository, RepositoryError,
    RepositoryResult, ReservationRepository,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Process-wide repository, set once at startup.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Create the environment-selected repository and install it globally.
///
/// Calling this again after a successful initialization is a no-op.
pub async fn init_repository() -> Result<()> {
    if REPOSITORY.get().is_some() {
        return Ok(());
    }

    let repo = RepositoryFactory::from_env()
        .await
        .context("Failed to initialize repository")?;
    if REPOSITORY.set(repo).is_err() {
        log::debug!("Repository was initialized concurrently; keeping the first instance");
    }
    Ok(())
}

/// The global repository installed by [`init_repository`].
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    REPOSITORY
        .get()
        .context("Database not initialized. Call init_repository() first.")
}
