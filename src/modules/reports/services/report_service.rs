use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::timezone::start_of_shop_day;
use crate::core::{AppError, Result};
use crate::modules::customers::models::Customer;
use crate::modules::customers::repositories::CustomerRepository;
use crate::modules::invoices::models::Invoice;
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::reports::models::{
    CategoryBreakdown, CustomerPurchase, DateRangeQuery, SalesReport, SalesRow, SalesTotals,
};

/// Reports aggregated in memory from stored invoices
pub struct ReportService {
    invoice_repo: Arc<dyn InvoiceRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
}

impl ReportService {
    pub fn new(
        invoice_repo: Arc<dyn InvoiceRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
    ) -> Self {
        Self {
            invoice_repo,
            customer_repo,
        }
    }

    /// Invoices dated in `[start_date, end_date)` in shop-local days, newest first
    pub async fn sales_report(&self, range: DateRangeQuery) -> Result<SalesReport> {
        if let (Some(start), Some(end)) = (range.start_date, range.end_date) {
            if start >= end {
                return Err(AppError::validation(format!(
                    "start_date ({}) must be before end_date ({})",
                    start, end
                )));
            }
        }

        let invoices = self
            .invoice_repo
            .list_between(
                range.start_date.map(start_of_shop_day),
                range.end_date.map(start_of_shop_day),
            )
            .await?;
        let customers = self.customers_by_id().await?;

        let report = build_sales_report(range, &invoices, &customers)?;

        if report.rows.is_empty() {
            warn!(
                start_date = ?range.start_date,
                end_date = ?range.end_date,
                "Empty sales report generated"
            );
        } else {
            info!(
                invoices = report.totals.invoice_count,
                total = %report.totals.total,
                "Sales report generated"
            );
        }

        Ok(report)
    }

    /// Purchase totals per customer, largest spenders first.
    ///
    /// Customers without invoices are listed with zero totals.
    pub async fn customer_analysis(&self, customer_id: Option<i64>) -> Result<Vec<CustomerPurchase>> {
        let customers = match customer_id {
            Some(id) => vec![self
                .customer_repo
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Customer {}", id)))?],
            None => self.customer_repo.list().await?,
        };

        let invoices = self.invoice_repo.list_between(None, None).await?;
        build_customer_analysis(&customers, &invoices)
    }

    /// Item totals per metal, highest revenue first
    pub async fn category_report(&self) -> Result<Vec<CategoryBreakdown>> {
        let invoices = self.invoice_repo.list_between(None, None).await?;
        build_category_report(&invoices)
    }

    async fn customers_by_id(&self) -> Result<HashMap<i64, Customer>> {
        Ok(self
            .customer_repo
            .list()
            .await?
            .into_iter()
            .map(|customer| (customer.id, customer))
            .collect())
    }
}

fn accumulate(total: &mut Decimal, value: Decimal) -> Result<()> {
    *total = total
        .checked_add(value)
        .ok_or_else(|| AppError::internal("Report total is out of range"))?;
    Ok(())
}

/// Sales rows in the order given, with column sums
pub fn build_sales_report(
    range: DateRangeQuery,
    invoices: &[Invoice],
    customers: &HashMap<i64, Customer>,
) -> Result<SalesReport> {
    let mut totals = SalesTotals::default();
    let mut rows = Vec::with_capacity(invoices.len());

    for invoice in invoices {
        let amounts = invoice.totals();
        let customer = customers.get(&invoice.customer_id);

        totals.invoice_count += 1;
        accumulate(&mut totals.subtotal, amounts.subtotal)?;
        accumulate(&mut totals.discount_amount, amounts.discount_amount)?;
        accumulate(&mut totals.cgst_amount, amounts.cgst_amount)?;
        accumulate(&mut totals.sgst_amount, amounts.sgst_amount)?;
        accumulate(&mut totals.total, amounts.total)?;

        rows.push(SalesRow {
            invoice_no: invoice.invoice_no.to_string(),
            date: invoice.date,
            customer_name: customer.map(|c| c.name.clone()),
            account_no: customer.and_then(|c| c.account_no.clone()),
            subtotal: amounts.subtotal,
            discount_amount: amounts.discount_amount,
            cgst_amount: amounts.cgst_amount,
            sgst_amount: amounts.sgst_amount,
            total: amounts.total,
        });
    }

    Ok(SalesReport {
        start_date: range.start_date,
        end_date: range.end_date,
        rows,
        totals,
    })
}

pub fn build_customer_analysis(
    customers: &[Customer],
    invoices: &[Invoice],
) -> Result<Vec<CustomerPurchase>> {
    let mut by_customer: HashMap<i64, CustomerPurchase> = customers
        .iter()
        .map(|customer| {
            (
                customer.id,
                CustomerPurchase {
                    customer_id: customer.id,
                    account_no: customer.account_no.clone(),
                    name: customer.name.clone(),
                    phone: customer.phone.clone(),
                    invoice_count: 0,
                    total_subtotal: Decimal::ZERO,
                    total_discount: Decimal::ZERO,
                    total_amount: Decimal::ZERO,
                    first_purchase: None,
                    last_purchase: None,
                },
            )
        })
        .collect();

    for invoice in invoices {
        let Some(entry) = by_customer.get_mut(&invoice.customer_id) else {
            continue;
        };

        entry.invoice_count += 1;
        accumulate(&mut entry.total_subtotal, invoice.totals().subtotal)?;
        accumulate(&mut entry.total_discount, invoice.totals().discount_amount)?;
        accumulate(&mut entry.total_amount, invoice.totals().total)?;
        entry.first_purchase = Some(entry.first_purchase.map_or(invoice.date, |d| d.min(invoice.date)));
        entry.last_purchase = Some(entry.last_purchase.map_or(invoice.date, |d| d.max(invoice.date)));
    }

    let mut analysis: Vec<CustomerPurchase> = by_customer.into_values().collect();
    analysis.sort_by(|a, b| {
        b.total_amount
            .cmp(&a.total_amount)
            .then(a.customer_id.cmp(&b.customer_id))
    });

    Ok(analysis)
}

#[derive(Default)]
struct CategoryAccumulator {
    invoices: HashSet<i64>,
    item_count: usize,
    total_weight: Decimal,
    rate_sum: Decimal,
    total_item_value: Decimal,
    total_wastage: Decimal,
    total_making: Decimal,
    total_amount: Decimal,
}

pub fn build_category_report(invoices: &[Invoice]) -> Result<Vec<CategoryBreakdown>> {
    let mut by_metal: BTreeMap<String, CategoryAccumulator> = BTreeMap::new();

    for invoice in invoices {
        for item in invoice.items() {
            let acc = by_metal.entry(item.metal().to_string()).or_default();
            let amounts = item.amounts();

            acc.invoices.insert(invoice.id);
            acc.item_count += 1;
            accumulate(&mut acc.total_weight, item.weight())?;
            accumulate(&mut acc.rate_sum, item.rate())?;
            accumulate(&mut acc.total_item_value, amounts.item_value)?;
            accumulate(&mut acc.total_wastage, amounts.wastage_amount)?;
            accumulate(&mut acc.total_making, amounts.making_amount)?;
            accumulate(&mut acc.total_amount, amounts.line_total)?;
        }
    }

    let mut report: Vec<CategoryBreakdown> = by_metal
        .into_iter()
        .map(|(metal, acc)| CategoryBreakdown {
            metal,
            invoice_count: acc.invoices.len(),
            item_count: acc.item_count,
            total_weight: acc.total_weight,
            average_rate: acc.rate_sum / Decimal::from(acc.item_count),
            total_item_value: acc.total_item_value,
            total_wastage: acc.total_wastage,
            total_making: acc.total_making,
            total_amount: acc.total_amount,
        })
        .collect();

    // Stable sort keeps metal order for equal totals
    report.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));

    Ok(report)
}
