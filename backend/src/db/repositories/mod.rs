//! Storage backends implementing the repository traits:
//! - `postgres`: PostgreSQL through Diesel
//! - `local`: in-memory store for development and tests
pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PoolStats, PostgresConfig, PostgresRepository};
