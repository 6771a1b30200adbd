// Whole-database backup and restore of shop data.
//
// A backup is a standalone SQLite file written with `VACUUM INTO`. A restore
// attaches an uploaded file and replaces the shop tables (customers,
// invoices, items, settings) in one transaction. Accounts, sessions and
// reset requests are left as they are, so whoever runs the restore stays
// logged in.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sqlx::{Connection, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::users::models::Principal;

const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

/// Restored tables in insert order, with their columns
const SHOP_TABLES: [(&str, &str); 4] = [
    ("customers", "id, account_no, name, phone, address"),
    (
        "invoices",
        "id, invoice_no, customer_id, date, subtotal, cgst_percent, sgst_percent, cgst_amount, \
         sgst_amount, discount_percent, discount_amount, total",
    ),
    (
        "invoice_items",
        "id, invoice_id, item_no, metal, weight, rate, wastage_percent, making_percent, \
         item_value, wastage_amount, making_amount, line_total",
    ),
    ("settings", "key, value, updated_at"),
];

/// Row counts copied in from a backup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub customers: u64,
    pub invoices: u64,
    pub invoice_items: u64,
    pub settings: u64,
}

impl RestoreReport {
    fn record(&mut self, table: &str, rows: u64) {
        match table {
            "customers" => self.customers = rows,
            "invoices" => self.invoices = rows,
            "invoice_items" => self.invoice_items = rows,
            _ => self.settings = rows,
        }
    }
}

pub struct BackupService {
    pool: SqlitePool,
}

impl BackupService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Snapshot the whole database as SQLite file bytes
    pub async fn export(&self, admin: &Principal) -> Result<Vec<u8>> {
        admin.require_admin()?;

        let path = scratch_path("backup");
        sqlx::query("VACUUM INTO ?")
            .bind(path_text(&path)?)
            .execute(&self.pool)
            .await?;

        let bytes = tokio::fs::read(&path).await;
        remove_scratch(&path).await;
        let bytes = bytes
            .map_err(|e| AppError::internal(format!("Failed to read backup file: {}", e)))?;

        tracing::info!(bytes = bytes.len(), exported_by = admin.user_id, "Database backup exported");
        Ok(bytes)
    }

    /// Replace the shop tables with those of an uploaded backup
    pub async fn restore(&self, admin: &Principal, backup: &[u8]) -> Result<RestoreReport> {
        admin.require_admin()?;

        if !backup.starts_with(SQLITE_HEADER) {
            return Err(AppError::validation("Upload is not a SQLite database backup"));
        }

        let path = scratch_path("restore");
        tokio::fs::write(&path, backup)
            .await
            .map_err(|e| AppError::internal(format!("Failed to stage backup file: {}", e)))?;

        let result = self.restore_from(&path).await;
        remove_scratch(&path).await;
        let report = result?;

        tracing::info!(
            customers = report.customers,
            invoices = report.invoices,
            restored_by = admin.user_id,
            "Database restored from backup"
        );
        Ok(report)
    }

    async fn restore_from(&self, path: &Path) -> Result<RestoreReport> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query("ATTACH DATABASE ? AS backup")
            .bind(path_text(path)?)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::validation(format!("Unreadable backup file: {}", e)))?;

        let copied = copy_shop_tables(&mut conn).await;

        // ATTACH is per connection and the connection goes back to the pool
        sqlx::query("DETACH DATABASE backup").execute(&mut *conn).await?;

        copied
    }
}

async fn copy_shop_tables(conn: &mut SqliteConnection) -> Result<RestoreReport> {
    for (table, _) in SHOP_TABLES {
        let present: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM backup.sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| AppError::validation(format!("Unreadable backup file: {}", e)))?;

        if present == 0 {
            return Err(AppError::validation(format!(
                "Backup has no '{}' table",
                table
            )));
        }
    }

    let mut report = RestoreReport::default();
    let mut tx = conn.begin().await?;

    for (table, _) in SHOP_TABLES.iter().rev() {
        sqlx::query(&format!("DELETE FROM main.{}", table))
            .execute(&mut *tx)
            .await?;
    }

    for (table, columns) in SHOP_TABLES {
        let rows = sqlx::query(&format!(
            "INSERT INTO main.{table} ({columns}) SELECT {columns} FROM backup.{table}"
        ))
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::validation(format!("Backup table '{}' is incompatible: {}", table, e)))?
        .rows_affected();

        report.record(table, rows);
    }

    tx.commit().await?;
    Ok(report)
}

fn scratch_path(purpose: &str) -> PathBuf {
    std::env::temp_dir().join(format!("jewelcalc-{}-{}.db", purpose, Uuid::new_v4()))
}

fn path_text(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| AppError::internal("Temporary directory path is not valid UTF-8"))
}

async fn remove_scratch(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove scratch file");
    }
}
