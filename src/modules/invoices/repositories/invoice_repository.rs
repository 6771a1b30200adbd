// InvoiceRepository: SQLite persistence for invoices and their line items.
//
// Header and items are always written together inside one transaction.
// Decimals are stored as TEXT and every loaded invoice is rebuilt through
// LineItem::new / InvoiceRevision::new, so derived amounts are re-checked on
// the way out as well as on the way in.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::core::money::parse_stored;
use crate::core::timezone::{parse_storage, to_storage};
use crate::core::{AppError, Result};
use crate::modules::invoices::models::{
    Invoice, InvoiceCharges, InvoiceNumber, InvoiceRevision, InvoiceSummary, LineItem, NewInvoice,
};
use crate::modules::invoices::services::number_generator::InvoiceNumberRegistry;

/// Persistence collaborator of the invoice service
#[async_trait]
pub trait InvoiceRepository: InvoiceNumberRegistry {
    /// Insert header and items atomically
    async fn create(&self, invoice: &NewInvoice) -> Result<Invoice>;

    async fn find_by_number(&self, invoice_no: &InvoiceNumber) -> Result<Option<Invoice>>;

    /// Listing rows, newest first
    async fn list_summaries(&self) -> Result<Vec<InvoiceSummary>>;

    /// Full invoices dated in `[start, end)`, newest first. Open bounds when `None`.
    async fn list_between(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Invoice>>;

    /// Replace all items and aggregate fields of an invoice in one transaction
    async fn replace_items(&self, invoice_id: i64, revision: &InvoiceRevision) -> Result<()>;

    /// Delete an invoice and its items. Returns false when nothing matched.
    async fn delete(&self, invoice_no: &InvoiceNumber) -> Result<bool>;
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: i64,
    invoice_no: String,
    customer_id: i64,
    date: String,
    discount_percent: String,
    cgst_percent: String,
    sgst_percent: String,
}

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    invoice_id: i64,
    metal: String,
    weight: String,
    rate: String,
    wastage_percent: String,
    making_percent: String,
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    invoice_no: String,
    date: String,
    total: String,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    account_no: Option<String>,
}

impl LineItemRow {
    fn into_line_item(self) -> Result<LineItem> {
        LineItem::new(
            self.metal,
            parse_stored(&self.weight, "weight")?,
            parse_stored(&self.rate, "rate")?,
            parse_stored(&self.wastage_percent, "wastage_percent")?,
            parse_stored(&self.making_percent, "making_percent")?,
        )
    }
}

impl InvoiceRow {
    fn into_invoice(self, items: Vec<LineItemRow>) -> Result<Invoice> {
        let charges = InvoiceCharges {
            discount_percent: parse_stored(&self.discount_percent, "discount_percent")?,
            cgst_percent: parse_stored(&self.cgst_percent, "cgst_percent")?,
            sgst_percent: parse_stored(&self.sgst_percent, "sgst_percent")?,
        };
        let items = items
            .into_iter()
            .map(LineItemRow::into_line_item)
            .collect::<Result<Vec<_>>>()
            .and_then(|items| InvoiceRevision::new(items, charges))
            .map_err(|e| {
                AppError::internal(format!("Stored invoice {} is inconsistent: {}", self.invoice_no, e))
            })?;

        Ok(Invoice {
            id: self.id,
            invoice_no: self.invoice_no.parse()?,
            customer_id: self.customer_id,
            date: parse_storage(&self.date, "date")?,
            revision: items,
        })
    }
}

impl SummaryRow {
    fn into_summary(self) -> Result<InvoiceSummary> {
        Ok(InvoiceSummary {
            id: self.id,
            invoice_no: self.invoice_no,
            date: parse_storage(&self.date, "date")?,
            total: parse_stored(&self.total, "total")?,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            account_no: self.account_no,
        })
    }
}

pub struct SqliteInvoiceRepository {
    pool: SqlitePool,
}

impl SqliteInvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert_items(
        tx: &mut Transaction<'_, Sqlite>,
        invoice_id: i64,
        items: &[LineItem],
    ) -> Result<()> {
        for (index, item) in items.iter().enumerate() {
            let amounts = item.amounts();

            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    invoice_id, item_no, metal, weight, rate, wastage_percent, making_percent,
                    item_value, wastage_amount, making_amount, line_total
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(invoice_id)
            .bind(index as i64 + 1)
            .bind(item.metal())
            .bind(item.weight().to_string())
            .bind(item.rate().to_string())
            .bind(item.wastage_percent().to_string())
            .bind(item.making_percent().to_string())
            .bind(amounts.item_value.to_string())
            .bind(amounts.wastage_amount.to_string())
            .bind(amounts.making_amount.to_string())
            .bind(amounts.line_total.to_string())
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    async fn fetch_items(&self, invoice_id: i64) -> Result<Vec<LineItemRow>> {
        let rows = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT invoice_id, metal, weight, rate, wastage_percent, making_percent
            FROM invoice_items
            WHERE invoice_id = ?
            ORDER BY item_no
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl InvoiceNumberRegistry for SqliteInvoiceRepository {
    async fn invoice_number_exists(&self, candidate: &InvoiceNumber) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE invoice_no = ?")
            .bind(candidate.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }
}

#[async_trait]
impl InvoiceRepository for SqliteInvoiceRepository {
    async fn create(&self, invoice: &NewInvoice) -> Result<Invoice> {
        let totals = invoice.revision.totals();
        let charges = invoice.revision.charges();
        let date = to_storage(invoice.date);

        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO invoices (
                invoice_no, customer_id, date, subtotal, cgst_percent, sgst_percent,
                cgst_amount, sgst_amount, discount_percent, discount_amount, total
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(invoice.invoice_no.as_str())
        .bind(invoice.customer_id)
        .bind(&date)
        .bind(totals.subtotal.to_string())
        .bind(charges.cgst_percent.to_string())
        .bind(charges.sgst_percent.to_string())
        .bind(totals.cgst_amount.to_string())
        .bind(totals.sgst_amount.to_string())
        .bind(charges.discount_percent.to_string())
        .bind(totals.discount_amount.to_string())
        .bind(totals.total.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::on_unique_violation(
                e,
                format!("invoice number {} already exists", invoice.invoice_no),
            )
        })?
        .last_insert_rowid();

        Self::insert_items(&mut tx, id, invoice.revision.items()).await?;

        tx.commit().await?;

        Ok(Invoice {
            id,
            invoice_no: invoice.invoice_no.clone(),
            customer_id: invoice.customer_id,
            // Same precision as a later read
            date: parse_storage(&date, "date")?,
            revision: invoice.revision.clone(),
        })
    }

    async fn find_by_number(&self, invoice_no: &InvoiceNumber) -> Result<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, invoice_no, customer_id, date, discount_percent, cgst_percent, sgst_percent
            FROM invoices
            WHERE invoice_no = ?
            "#,
        )
        .bind(invoice_no.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.fetch_items(row.id).await?;
        Ok(Some(row.into_invoice(items)?))
    }

    async fn list_summaries(&self) -> Result<Vec<InvoiceSummary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT i.id, i.invoice_no, i.date, i.total,
                   c.name AS customer_name, c.phone AS customer_phone, c.account_no
            FROM invoices i
            LEFT JOIN customers c ON c.id = i.customer_id
            ORDER BY i.date DESC, i.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SummaryRow::into_summary).collect()
    }

    async fn list_between(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Invoice>> {
        let start = start.map(to_storage);
        let end = end.map(to_storage);

        let headers = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, invoice_no, customer_id, date, discount_percent, cgst_percent, sgst_percent
            FROM invoices
            WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date < ?2)
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(&start)
        .bind(&end)
        .fetch_all(&self.pool)
        .await?;

        let item_rows = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT ii.invoice_id, ii.metal, ii.weight, ii.rate, ii.wastage_percent, ii.making_percent
            FROM invoice_items ii
            JOIN invoices i ON i.id = ii.invoice_id
            WHERE (?1 IS NULL OR i.date >= ?1) AND (?2 IS NULL OR i.date < ?2)
            ORDER BY ii.invoice_id, ii.item_no
            "#,
        )
        .bind(&start)
        .bind(&end)
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_invoice: HashMap<i64, Vec<LineItemRow>> = HashMap::new();
        for row in item_rows {
            items_by_invoice.entry(row.invoice_id).or_default().push(row);
        }

        headers
            .into_iter()
            .map(|header| {
                let items = items_by_invoice.remove(&header.id).unwrap_or_default();
                header.into_invoice(items)
            })
            .collect()
    }

    async fn replace_items(&self, invoice_id: i64, revision: &InvoiceRevision) -> Result<()> {
        let totals = revision.totals();
        let charges = revision.charges();

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE invoices
            SET subtotal = ?, cgst_percent = ?, sgst_percent = ?, cgst_amount = ?,
                sgst_amount = ?, discount_percent = ?, discount_amount = ?, total = ?
            WHERE id = ?
            "#,
        )
        .bind(totals.subtotal.to_string())
        .bind(charges.cgst_percent.to_string())
        .bind(charges.sgst_percent.to_string())
        .bind(totals.cgst_amount.to_string())
        .bind(totals.sgst_amount.to_string())
        .bind(charges.discount_percent.to_string())
        .bind(totals.discount_amount.to_string())
        .bind(totals.total.to_string())
        .bind(invoice_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Invoice {} not found", invoice_id)));
        }

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?")
            .bind(invoice_id)
            .execute(&mut *tx)
            .await?;

        Self::insert_items(&mut tx, invoice_id, revision.items()).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn delete(&self, invoice_no: &InvoiceNumber) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM invoice_items WHERE invoice_id IN (SELECT id FROM invoices WHERE invoice_no = ?)",
        )
        .bind(invoice_no.as_str())
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM invoices WHERE invoice_no = ?")
            .bind(invoice_no.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(deleted.rows_affected() > 0)
    }
}
