//! PostgreSQL implementation of the persistence layer.
//!
//! Every booking commit runs in one transaction with guarded updates, so
//! the database refuses an oversell or a double-booked seat on its own even
//! if two processes share it.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::models::{BookingRow, PoolRow, SeatRow, state_from_rows, to_i32};
use super::{PersistenceBackend, StoredPool};
use crate::config::ServiceConfig;
use crate::domain::{BookingRecord, Pool, PoolKind, PoolState};
use crate::error::InventoryError;

/// PostgreSQL-backed [`PersistenceBackend`] using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    /// Creates a backend over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::StorageFailure`] if the database is
    /// unreachable.
    pub async fn connect(config: &ServiceConfig) -> Result<Self, InventoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| InventoryError::StorageFailure(format!("failed to connect: {e}")))?;
        Ok(Self::new(pool))
    }

    /// Creates the `pools`, `pool_seats` and `bookings` tables if missing.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::StorageFailure`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), InventoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| InventoryError::StorageFailure(format!("migration failed: {e}")))
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PersistenceBackend for PostgresBackend {
    async fn insert_pool(&self, pool: &Pool, state: &PoolState) -> Result<(), InventoryError> {
        let total = to_i32(pool.total, "total")?;
        let booked = to_i32(state.booked(), "booked")?;
        let attributes = serde_json::to_value(&pool.metadata.attributes)
            .map_err(|e| InventoryError::StorageFailure(format!("attributes: {e}")))?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO pools (id, kind, total, booked, name, attributes, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(pool.id.as_uuid())
        .bind(pool.kind.as_str())
        .bind(total)
        .bind(booked)
        .bind(&pool.metadata.name)
        .bind(attributes)
        .bind(pool.created_at)
        .execute(&mut *tx)
        .await?;

        if pool.kind == PoolKind::Slotted {
            sqlx::query(
                "INSERT INTO pool_seats (pool_id, seat_number, status) \
                 SELECT $1, n, 'available' FROM generate_series(1, $2) AS n",
            )
            .bind(pool.id.as_uuid())
            .bind(total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn commit_booking(
        &self,
        pool: &Pool,
        _next_state: &PoolState,
        record: &BookingRecord,
    ) -> Result<(), InventoryError> {
        let pool_id = pool.id.as_uuid();
        let units = to_i32(record.allocated_units(), "units")?;
        let allocation = serde_json::to_value(&record.allocation)
            .map_err(|e| InventoryError::StorageFailure(format!("allocation: {e}")))?;

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE pools SET booked = booked + $2 WHERE id = $1 AND booked + $2 <= total",
        )
        .bind(pool_id)
        .bind(units)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() != 1 {
            let _ = tx.rollback().await;
            return Err(InventoryError::StorageFailure(format!(
                "pool {} refused {units} units",
                pool.id
            )));
        }

        if let Some(seat_numbers) = record.allocation.seat_numbers() {
            let seats = seat_numbers
                .iter()
                .map(|&n| to_i32(n, "seat_number"))
                .collect::<Result<Vec<i32>, _>>()?;
            let updated = sqlx::query(
                "UPDATE pool_seats SET status = 'booked', booking_id = $3 \
                 WHERE pool_id = $1 AND seat_number = ANY($2) AND status = 'available'",
            )
            .bind(pool_id)
            .bind(&seats)
            .bind(record.booking_id.as_uuid())
            .execute(&mut *tx)
            .await?;
            if updated.rows_affected() != seats.len() as u64 {
                let _ = tx.rollback().await;
                return Err(InventoryError::StorageFailure(format!(
                    "pool {} refused seats {seat_numbers:?}",
                    pool.id
                )));
            }
        }

        sqlx::query(
            "INSERT INTO bookings \
             (id, pool_id, first_name, last_name, email, allocation, units, remaining_after, booked_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(record.booking_id.as_uuid())
        .bind(pool_id)
        .bind(&record.customer.first_name)
        .bind(&record.customer.last_name)
        .bind(&record.customer.email)
        .bind(allocation)
        .bind(units)
        .bind(to_i32(record.remaining_after, "remaining_after")?)
        .bind(record.booked_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn load(&self) -> Result<Vec<StoredPool>, InventoryError> {
        let pools = sqlx::query_as::<_, PoolRow>(
            "SELECT id, kind, total, booked, name, attributes, created_at \
             FROM pools ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        let seats = sqlx::query_as::<_, SeatRow>(
            "SELECT pool_id, seat_number, status FROM pool_seats ORDER BY pool_id, seat_number",
        )
        .fetch_all(&self.pool)
        .await?;
        let bookings = sqlx::query_as::<_, BookingRow>(
            "SELECT id, pool_id, first_name, last_name, email, allocation, remaining_after, booked_at \
             FROM bookings ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut stored = Vec::with_capacity(pools.len());
        for row in &pools {
            let pool_seats: Vec<SeatRow> = seats
                .iter()
                .filter(|s| s.pool_id == row.id)
                .cloned()
                .collect();
            let ledger = bookings
                .iter()
                .filter(|b| b.pool_id == row.id)
                .map(BookingRow::to_record)
                .collect::<Result<Vec<_>, _>>()?;
            stored.push(StoredPool {
                pool: row.to_pool()?,
                state: state_from_rows(row, &pool_seats)?,
                bookings: ledger,
            });
        }
        tracing::debug!(pools = stored.len(), bookings = bookings.len(), "loaded from postgres");
        Ok(stored)
    }
}

