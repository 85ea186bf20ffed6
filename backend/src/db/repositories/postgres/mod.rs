//! Postgres repository implementation using Diesel.
//!
//! Tables: `listings`, `photos` and `reservations` (see the embedded
//! migrations). Photos and reservations are deleted with their listing.
//!
//! Reservation writes run their overlap check inside a SERIALIZABLE
//! transaction, and the `reservations_no_overlap` exclusion constraint
//! rejects any overlapping active pair that slips past it.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::{count_star, exists};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::db::repository::{
    ErrorContext, ListingRepository, PhotoRepository, RepositoryError, RepositoryResult,
    ReservationRepository, OVERLAP_CONSTRAINT,
};
use crate::models::{
    DateRange, Listing, ListingFilter, ListingId, ListingInput, NewPhoto, NewReservation, Paged,
    Photo, PhotoId, Reservation, ReservationFilter, ReservationId, ReservationStatus,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connection_timeout_sec: u64,
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables (see module docs).
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;
        let defaults = Self::default();

        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    pub connections_in_use: u32,
    pub idle_connections: u32,
    pub total_connections: u32,
    pub max_size: u32,
    pub total_queries: u64,
    pub failed_queries: u64,
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        log::info!(
            "Postgres repository ready (pool max={}, min={})",
            config.max_pool_size,
            config.min_pool_size
        );

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;
        if !applied.is_empty() {
            log::info!("Applied {} database migration(s)", applied.len());
        }
        Ok(())
    }

    /// Run `f` on a pooled connection inside `spawn_blocking`, retrying
    /// retryable failures with exponential backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::timeout_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::debug!("Retrying after transient error: {}", e);
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    /// Returns `(is_healthy, latency_ms, error_message)`.
    pub async fn health_check_detailed(&self) -> (bool, Option<u64>, Option<String>) {
        let start = Instant::now();
        let result = self.health_check().await;
        let latency = Some(start.elapsed().as_millis() as u64);
        match result {
            Ok(true) => (true, latency, None),
            Ok(false) => (false, latency, Some("Health check returned false".to_string())),
            Err(e) => (false, latency, Some(e.to_string())),
        }
    }
}

fn listing_not_found(operation: &str, id: ListingId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Listing {} not found", id),
        ErrorContext::new(operation)
            .with_entity("listing")
            .with_entity_id(id),
    )
}

fn ensure_listing(conn: &mut PgConnection, operation: &str, id: ListingId) -> RepositoryResult<()> {
    let found: bool = diesel::select(exists(listings::table.find(id.value()))).get_result(conn)?;
    if found {
        Ok(())
    } else {
        Err(listing_not_found(operation, id))
    }
}

/// Map a diesel NotFound for a single-row lookup onto a descriptive error.
fn lookup<T>(
    result: QueryResult<T>,
    entity: &str,
    operation: &str,
    id: impl ToString,
) -> RepositoryResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(diesel::result::Error::NotFound) => {
            let id = id.to_string();
            Err(RepositoryError::not_found_with_context(
                format!("{} {} not found", entity, id),
                ErrorContext::new(operation)
                    .with_entity(entity.to_lowercase())
                    .with_entity_id(id),
            ))
        }
        Err(e) => Err(RepositoryError::from(e).with_operation(operation)),
    }
}

fn active_status_values() -> Vec<&'static str> {
    ReservationStatus::ACTIVE.iter().map(|s| s.as_str()).collect()
}

/// Active reservations on `listing_id` overlapping `stay` (half-open), minus `exclude`.
fn load_overlapping(
    conn: &mut PgConnection,
    listing_id: ListingId,
    stay: DateRange,
    exclude: Option<ReservationId>,
    limit: Option<i64>,
) -> QueryResult<Vec<ReservationRow>> {
    let mut query = reservations::table
        .select(ReservationRow::as_select())
        .filter(reservations::listing_id.eq(listing_id.value()))
        .filter(reservations::status.eq_any(active_status_values()))
        .filter(reservations::check_in.lt(stay.check_out))
        .filter(reservations::check_out.gt(stay.check_in))
        .into_boxed();
    if let Some(id) = exclude {
        query = query.filter(reservations::id.ne(id.value()));
    }
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    query
        .order((reservations::check_in.asc(), reservations::id.asc()))
        .load(conn)
}

fn overlap_conflict(operation: &str, listing_id: ListingId, stay: &DateRange) -> RepositoryError {
    RepositoryError::conflict_with_context(
        format!("Listing {} is already booked for {}", listing_id, stay),
        ErrorContext::new(operation)
            .with_entity("reservation")
            .with_details(OVERLAP_CONSTRAINT),
    )
}

fn rows_into<R, T>(rows: Vec<R>) -> RepositoryResult<Vec<T>>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl ListingRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn create_listing(&self, input: &ListingInput) -> RepositoryResult<Listing> {
        let values = ListingValues::from(input);
        self.with_conn(move |conn| {
            let row: ListingRow = diesel::insert_into(listings::table)
                .values(&values)
                .returning(ListingRow::as_returning())
                .get_result(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("create_listing"))?;
            Listing::try_from(row)
        })
        .await
    }

    async fn get_listing(&self, id: ListingId) -> RepositoryResult<Listing> {
        self.with_conn(move |conn| {
            let row = lookup(
                listings::table
                    .find(id.value())
                    .select(ListingRow::as_select())
                    .first::<ListingRow>(conn),
                "Listing",
                "get_listing",
                id,
            )?;
            Listing::try_from(row)
        })
        .await
    }

    async fn find_listing_by_name(&self, name: &str) -> RepositoryResult<Option<Listing>> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            listings::table
                .filter(listings::name.eq(&name))
                .select(ListingRow::as_select())
                .first::<ListingRow>(conn)
                .optional()?
                .map(Listing::try_from)
                .transpose()
        })
        .await
    }

    async fn list_listings(&self, filter: &ListingFilter) -> RepositoryResult<Paged<Listing>> {
        let filter = *filter;
        self.with_conn(move |conn| {
            let mut count_query = listings::table.select(count_star()).into_boxed();
            let mut query = listings::table.select(ListingRow::as_select()).into_boxed();
            if let Some(available) = filter.available {
                count_query = count_query.filter(listings::available.eq(available));
                query = query.filter(listings::available.eq(available));
            }

            let total: i64 = count_query.get_result(conn)?;
            let rows: Vec<ListingRow> = query
                .order((listings::name.asc(), listings::id.asc()))
                .limit(to_i64(filter.page.limit()))
                .offset(to_i64(filter.page.offset()))
                .load(conn)?;

            Ok(Paged::new(rows_into(rows)?, total.max(0) as u64, filter.page))
        })
        .await
    }

    async fn update_listing(
        &self,
        id: ListingId,
        input: &ListingInput,
    ) -> RepositoryResult<Listing> {
        let values = ListingValues::from(input);
        self.with_conn(move |conn| {
            let row = lookup(
                diesel::update(listings::table.find(id.value()))
                    .set((&values, listings::updated_at.eq(Utc::now())))
                    .returning(ListingRow::as_returning())
                    .get_result::<ListingRow>(conn),
                "Listing",
                "update_listing",
                id,
            )?;
            Listing::try_from(row)
        })
        .await
    }

    async fn delete_listing(&self, id: ListingId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(listings::table.find(id.value())).execute(conn)?;
            if deleted == 0 {
                return Err(listing_not_found("delete_listing", id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl PhotoRepository for PostgresRepository {
    async fn create_photo(&self, photo: &NewPhoto) -> RepositoryResult<Photo> {
        let values = PhotoValues::from(photo);
        let listing_id = photo.listing_id;
        self.with_conn(move |conn| {
            ensure_listing(conn, "create_photo", listing_id)?;
            let row: PhotoRow = diesel::insert_into(photos::table)
                .values(&values)
                .returning(PhotoRow::as_returning())
                .get_result(conn)?;
            Photo::try_from(row)
        })
        .await
    }

    async fn get_photo(&self, id: PhotoId) -> RepositoryResult<Photo> {
        self.with_conn(move |conn| {
            let row = lookup(
                photos::table
                    .find(id.value())
                    .select(PhotoRow::as_select())
                    .first::<PhotoRow>(conn),
                "Photo",
                "get_photo",
                id,
            )?;
            Photo::try_from(row)
        })
        .await
    }

    async fn list_photos(&self, listing_id: Option<ListingId>) -> RepositoryResult<Vec<Photo>> {
        self.with_conn(move |conn| {
            let mut query = photos::table.select(PhotoRow::as_select()).into_boxed();
            if let Some(listing_id) = listing_id {
                query = query.filter(photos::listing_id.eq(listing_id.value()));
            }
            let rows: Vec<PhotoRow> = query
                .order((photos::sort_order.asc(), photos::id.asc()))
                .load(conn)?;
            rows_into(rows)
        })
        .await
    }

    async fn photos_for_listings(
        &self,
        listing_ids: &[ListingId],
    ) -> RepositoryResult<Vec<Photo>> {
        if listing_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = listing_ids.iter().map(|id| id.value()).collect();
        self.with_conn(move |conn| {
            let rows: Vec<PhotoRow> = photos::table
                .filter(photos::listing_id.eq_any(&ids))
                .select(PhotoRow::as_select())
                .order((photos::sort_order.asc(), photos::id.asc()))
                .load(conn)?;
            rows_into(rows)
        })
        .await
    }

    async fn update_photo(&self, id: PhotoId, photo: &NewPhoto) -> RepositoryResult<Photo> {
        let values = PhotoValues::from(photo);
        let listing_id = photo.listing_id;
        self.with_conn(move |conn| {
            ensure_listing(conn, "update_photo", listing_id)?;
            let row = lookup(
                diesel::update(photos::table.find(id.value()))
                    .set((&values, photos::updated_at.eq(Utc::now())))
                    .returning(PhotoRow::as_returning())
                    .get_result::<PhotoRow>(conn),
                "Photo",
                "update_photo",
                id,
            )?;
            Photo::try_from(row)
        })
        .await
    }

    async fn delete_photo(&self, id: PhotoId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(photos::table.find(id.value())).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("Photo {} not found", id),
                    ErrorContext::new("delete_photo")
                        .with_entity("photo")
                        .with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ReservationRepository for PostgresRepository {
    async fn create_reservation(
        &self,
        reservation: &NewReservation,
    ) -> RepositoryResult<Reservation> {
        let row = NewReservationRow::from(reservation);
        let listing_id = reservation.listing_id;
        let stay = reservation.stay();
        self.with_conn(move |conn| {
            conn.build_transaction()
                .serializable()
                .run(|tx| -> RepositoryResult<Reservation> {
                    ensure_listing(tx, "create_reservation", listing_id)?;

                    let clashes = load_overlapping(tx, listing_id, stay, None, Some(1))?;
                    if !clashes.is_empty() {
                        return Err(overlap_conflict("create_reservation", listing_id, &stay));
                    }

                    let inserted: ReservationRow = diesel::insert_into(reservations::table)
                        .values(&row)
                        .returning(ReservationRow::as_returning())
                        .get_result(tx)?;
                    Reservation::try_from(inserted)
                })
        })
        .await
    }

    async fn get_reservation(&self, id: ReservationId) -> RepositoryResult<Reservation> {
        self.with_conn(move |conn| {
            let row = lookup(
                reservations::table
                    .find(id.value())
                    .select(ReservationRow::as_select())
                    .first::<ReservationRow>(conn),
                "Reservation",
                "get_reservation",
                id,
            )?;
            Reservation::try_from(row)
        })
        .await
    }

    async fn list_reservations(
        &self,
        filter: &ReservationFilter,
    ) -> RepositoryResult<Paged<Reservation>> {
        let filter = *filter;
        self.with_conn(move |conn| {
            let mut count_query = reservations::table.select(count_star()).into_boxed();
            let mut query = reservations::table
                .select(ReservationRow::as_select())
                .into_boxed();
            if let Some(listing_id) = filter.listing_id {
                count_query = count_query.filter(reservations::listing_id.eq(listing_id.value()));
                query = query.filter(reservations::listing_id.eq(listing_id.value()));
            }
            if let Some(status) = filter.status {
                count_query = count_query.filter(reservations::status.eq(status.as_str()));
                query = query.filter(reservations::status.eq(status.as_str()));
            }

            let total: i64 = count_query.get_result(conn)?;
            let rows: Vec<ReservationRow> = query
                .order((reservations::created_at.desc(), reservations::id.desc()))
                .limit(to_i64(filter.page.limit()))
                .offset(to_i64(filter.page.offset()))
                .load(conn)?;

            Ok(Paged::new(rows_into(rows)?, total.max(0) as u64, filter.page))
        })
        .await
    }

    async fn find_overlapping_reservations(
        &self,
        listing_id: ListingId,
        stay: &DateRange,
        exclude: Option<ReservationId>,
    ) -> RepositoryResult<Vec<Reservation>> {
        let stay = *stay;
        self.with_conn(move |conn| {
            let rows = load_overlapping(conn, listing_id, stay, exclude, None)?;
            rows_into(rows)
        })
        .await
    }

    async fn update_reservation(
        &self,
        reservation: &Reservation,
    ) -> RepositoryResult<Reservation> {
        let changes = ReservationChanges::from(reservation);
        let id = reservation.id;
        let listing_id = reservation.listing_id;
        let stay = reservation.stay();
        self.with_conn(move |conn| {
            conn.build_transaction()
                .serializable()
                .run(|tx| -> RepositoryResult<Reservation> {
                    let status: String = lookup(
                        reservations::table
                            .find(id.value())
                            .select(reservations::status)
                            .first::<String>(tx),
                        "Reservation",
                        "update_reservation",
                        id,
                    )?;
                    ensure_listing(tx, "update_reservation", listing_id)?;

                    let is_active = ReservationStatus::from_str(&status)
                        .map(|s| s.is_active())
                        .unwrap_or(false);
                    if is_active {
                        let clashes = load_overlapping(tx, listing_id, stay, Some(id), Some(1))?;
                        if !clashes.is_empty() {
                            return Err(overlap_conflict("update_reservation", listing_id, &stay));
                        }
                    }

                    let row: ReservationRow = diesel::update(reservations::table.find(id.value()))
                        .set((&changes, reservations::updated_at.eq(Utc::now())))
                        .returning(ReservationRow::as_returning())
                        .get_result(tx)?;
                    Reservation::try_from(row)
                })
        })
        .await
    }

    async fn set_reservation_status(
        &self,
        id: ReservationId,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> RepositoryResult<Reservation> {
        self.with_conn(move |conn| {
            let updated: Option<ReservationRow> = diesel::update(
                reservations::table
                    .filter(reservations::id.eq(id.value()))
                    .filter(reservations::status.eq(from.as_str())),
            )
            .set((
                reservations::status.eq(to.as_str()),
                reservations::updated_at.eq(Utc::now()),
            ))
            .returning(ReservationRow::as_returning())
            .get_result(conn)
            .optional()?;

            match updated {
                Some(row) => Reservation::try_from(row),
                None => {
                    let still_exists: bool =
                        diesel::select(exists(reservations::table.find(id.value())))
                            .get_result(conn)?;
                    let context = ErrorContext::new("set_reservation_status")
                        .with_entity("reservation")
                        .with_entity_id(id);
                    if still_exists {
                        Err(RepositoryError::conflict_with_context(
                            format!("Reservation {} is no longer {}", id, from),
                            context,
                        ))
                    } else {
                        Err(RepositoryError::not_found_with_context(
                            format!("Reservation {} not found", id),
                            context,
                        ))
                    }
                }
            }
        })
        .await
    }
}
