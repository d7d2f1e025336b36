//! SQLite persistence for shipments and their status history.
//!
//! Connection pooling, automatic migrations, and WAL mode for concurrent
//! reads. All timestamps are stored as Unix milliseconds.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Shipment, ShipmentStatus, StatusEvent};

/// Shipment database handle over a SQLite pool.
pub struct ShipmentStore {
    pool: SqlitePool,
}

impl ShipmentStore {
    /// Open (creating if missing) the database at `database_url` and run
    /// migrations.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        // SqliteConnectOptions creates the file but not its parent directory
        if let Some(path) = database_url.strip_prefix("sqlite:") {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30))
            .pragma("synchronous", "NORMAL");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Wrap an existing pool (tests use an in-memory pool).
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Shipment database migrations completed");
        Ok(())
    }

    /// Insert a shipment and its initial history row in one transaction.
    pub async fn create(&self, shipment: &Shipment, actor: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO shipments (
                id, tenant, tracking_number,
                sender_name, sender_phone,
                recipient_name, recipient_phone, recipient_address,
                weight_lbs, urgent,
                base_price, handling_fee, urgent_fee, total_usd, total_cup,
                status, created_at, updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(shipment.id.to_string())
        .bind(&shipment.tenant)
        .bind(&shipment.tracking_number)
        .bind(&shipment.sender_name)
        .bind(&shipment.sender_phone)
        .bind(&shipment.recipient_name)
        .bind(&shipment.recipient_phone)
        .bind(&shipment.recipient_address)
        .bind(shipment.weight_lbs)
        .bind(shipment.urgent)
        .bind(shipment.base_price)
        .bind(shipment.handling_fee)
        .bind(shipment.urgent_fee)
        .bind(shipment.total_usd)
        .bind(shipment.total_cup)
        .bind(shipment.status.as_str())
        .bind(shipment.created_at.timestamp_millis())
        .bind(shipment.updated_at.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO status_history (shipment_id, status, note, changed_by, changed_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(shipment.id.to_string())
        .bind(shipment.status.as_str())
        .bind(Option::<String>::None)
        .bind(actor)
        .bind(shipment.created_at.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Whether a tracking number is already taken, across all tenants.
    pub async fn tracking_number_exists(&self, tracking_number: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM shipments WHERE tracking_number = ?")
            .bind(tracking_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Tenant-scoped lookup by tracking number.
    pub async fn get(&self, tenant: &str, tracking_number: &str) -> Result<Shipment, AppError> {
        let row = sqlx::query(
            "SELECT * FROM shipments WHERE tenant = ? AND tracking_number = ?",
        )
        .bind(tenant)
        .bind(tracking_number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shipment {} not found", tracking_number)))?;

        row_to_shipment(&row)
    }

    /// Cross-tenant lookup for the public tracking endpoint. The tracking
    /// number is globally unique, so this is unambiguous.
    pub async fn track(&self, tracking_number: &str) -> Result<Shipment, AppError> {
        let row = sqlx::query("SELECT * FROM shipments WHERE tracking_number = ?")
            .bind(tracking_number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("shipment {} not found", tracking_number)))?;

        row_to_shipment(&row)
    }

    /// List a tenant's shipments, newest first, optionally filtered by status.
    pub async fn list(
        &self,
        tenant: &str,
        status: Option<ShipmentStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Shipment>, AppError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT * FROM shipments WHERE tenant = ? AND status = ?
                     ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
                )
                .bind(tenant)
                .bind(status.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT * FROM shipments WHERE tenant = ?
                     ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
                )
                .bind(tenant)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(row_to_shipment).collect()
    }

    /// Apply a status change and append the history row transactionally.
    ///
    /// The UPDATE is guarded on the expected current status, so a concurrent
    /// change between the caller's read and this write surfaces as a
    /// transition conflict instead of silently overwriting.
    pub async fn update_status(
        &self,
        tenant: &str,
        tracking_number: &str,
        expected: ShipmentStatus,
        new_status: ShipmentStatus,
        note: Option<&str>,
        actor: &str,
    ) -> Result<Shipment, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE shipments SET status = ?, updated_at = ?
             WHERE tenant = ? AND tracking_number = ? AND status = ?",
        )
        .bind(new_status.as_str())
        .bind(now.timestamp_millis())
        .bind(tenant)
        .bind(tracking_number)
        .bind(expected.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidTransition(format!(
                "shipment {} is no longer in status {}",
                tracking_number, expected
            )));
        }

        let row = sqlx::query(
            "SELECT * FROM shipments WHERE tenant = ? AND tracking_number = ?",
        )
        .bind(tenant)
        .bind(tracking_number)
        .fetch_one(&mut *tx)
        .await?;
        let shipment = row_to_shipment(&row)?;

        sqlx::query(
            "INSERT INTO status_history (shipment_id, status, note, changed_by, changed_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(shipment.id.to_string())
        .bind(new_status.as_str())
        .bind(note)
        .bind(actor)
        .bind(now.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(shipment)
    }

    /// A shipment's status history, oldest first.
    pub async fn history(&self, shipment_id: Uuid) -> Result<Vec<StatusEvent>, AppError> {
        let rows = sqlx::query(
            "SELECT status, note, changed_by, changed_at FROM status_history
             WHERE shipment_id = ? ORDER BY changed_at, id",
        )
        .bind(shipment_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(StatusEvent {
                    status: parse_status(row.get("status"))?,
                    note: row.get("note"),
                    changed_by: row.get("changed_by"),
                    changed_at: parse_timestamp(row.get("changed_at"))?,
                })
            })
            .collect()
    }
}

fn row_to_shipment(row: &SqliteRow) -> Result<Shipment, AppError> {
    let id: String = row.get("id");
    Ok(Shipment {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::InternalError(format!("corrupt shipment id: {}", e)))?,
        tenant: row.get("tenant"),
        tracking_number: row.get("tracking_number"),
        sender_name: row.get("sender_name"),
        sender_phone: row.get("sender_phone"),
        recipient_name: row.get("recipient_name"),
        recipient_phone: row.get("recipient_phone"),
        recipient_address: row.get("recipient_address"),
        weight_lbs: row.get("weight_lbs"),
        urgent: row.get("urgent"),
        base_price: row.get("base_price"),
        handling_fee: row.get("handling_fee"),
        urgent_fee: row.get("urgent_fee"),
        total_usd: row.get("total_usd"),
        total_cup: row.get("total_cup"),
        status: parse_status(row.get("status"))?,
        created_at: parse_timestamp(row.get("created_at"))?,
        updated_at: parse_timestamp(row.get("updated_at"))?,
    })
}

fn parse_status(raw: String) -> Result<ShipmentStatus, AppError> {
    ShipmentStatus::parse(&raw)
        .ok_or_else(|| AppError::InternalError(format!("corrupt shipment status: {}", raw)))
}

fn parse_timestamp(millis: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::InternalError(format!("corrupt timestamp: {}", millis)))
}
