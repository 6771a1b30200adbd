use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::core::{AppError, Result};
use crate::modules::customers::models::Customer;
use crate::modules::customers::repositories::CustomerRepository;
use crate::modules::invoices::models::{
    CreateInvoiceRequest, ImportReport, ImportedInvoice, Invoice, InvoiceCharges, InvoiceDraft,
    InvoiceNumber, InvoicePreview, InvoiceResponse, InvoiceRevision, InvoiceSummary, LineItem,
    LineItemInput, NewInvoice, ReviseInvoiceRequest,
};
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::invoices::services::number_generator::InvoiceNumberGenerator;
use crate::modules::settings::models::ShopSettings;
use crate::modules::settings::services::SettingsService;

/// Service for invoice business logic
pub struct InvoiceService {
    invoice_repo: Arc<dyn InvoiceRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    settings: Arc<SettingsService>,
    number_generator: InvoiceNumberGenerator,
}

impl InvoiceService {
    pub fn new(
        invoice_repo: Arc<dyn InvoiceRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        settings: Arc<SettingsService>,
        number_generator: InvoiceNumberGenerator,
    ) -> Self {
        Self {
            invoice_repo,
            customer_repo,
            settings,
            number_generator,
        }
    }

    /// Price the request, mint an invoice number and store everything atomically
    pub async fn create_invoice(&self, request: CreateInvoiceRequest) -> Result<InvoiceResponse> {
        ensure_has_items(&request.items)?;

        let customer = self.require_customer(request.customer_id).await?;
        let settings = self.settings.get_settings().await?;
        let charges = InvoiceCharges {
            discount_percent: request.discount_percent.unwrap_or(Decimal::ZERO),
            cgst_percent: request.cgst_percent.unwrap_or(settings.cgst_percent),
            sgst_percent: request.sgst_percent.unwrap_or(settings.sgst_percent),
        };

        let revision = build_draft(&request.items, &settings)?
            .with_customer(customer.id)
            .with_charges(charges)
            .into_revision()?;

        let invoice_no = self.number_generator.generate(self.invoice_repo.as_ref()).await?;
        let invoice = self
            .invoice_repo
            .create(&NewInvoice {
                invoice_no,
                customer_id: customer.id,
                date: Utc::now(),
                revision,
            })
            .await?;

        tracing::info!(
            invoice_no = %invoice.invoice_no,
            customer_id = customer.id,
            items = invoice.items().len(),
            total = %invoice.totals().total,
            "Invoice created"
        );

        Ok(InvoiceResponse {
            invoice,
            customer: Some(customer),
        })
    }

    /// Totals for an item list without storing anything
    pub async fn preview_invoice(&self, request: ReviseInvoiceRequest) -> Result<InvoicePreview> {
        ensure_has_items(&request.items)?;

        let settings = self.settings.get_settings().await?;
        let charges = InvoiceCharges {
            discount_percent: request.discount_percent.unwrap_or(Decimal::ZERO),
            cgst_percent: request.cgst_percent.unwrap_or(settings.cgst_percent),
            sgst_percent: request.sgst_percent.unwrap_or(settings.sgst_percent),
        };

        let draft = build_draft(&request.items, &settings)?.with_charges(charges);
        let totals = draft.totals()?;

        Ok(InvoicePreview {
            items: draft.items().to_vec(),
            charges,
            totals,
        })
    }

    pub async fn get_invoice(&self, invoice_no: &str) -> Result<InvoiceResponse> {
        let invoice = self.require_invoice(invoice_no).await?;
        let customer = self.customer_repo.find_by_id(invoice.customer_id).await?;

        Ok(InvoiceResponse { invoice, customer })
    }

    pub async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>> {
        self.invoice_repo.list_summaries().await
    }

    /// Replace an invoice's items and charges as a whole.
    ///
    /// Omitted charges keep the invoice's current values. The stored item set
    /// is deleted and re-inserted with freshly derived totals.
    pub async fn update_invoice(
        &self,
        invoice_no: &str,
        request: ReviseInvoiceRequest,
    ) -> Result<InvoiceResponse> {
        ensure_has_items(&request.items)?;

        let existing = self.require_invoice(invoice_no).await?;
        let settings = self.settings.get_settings().await?;
        let current = *existing.charges();
        let charges = InvoiceCharges {
            discount_percent: request.discount_percent.unwrap_or(current.discount_percent),
            cgst_percent: request.cgst_percent.unwrap_or(current.cgst_percent),
            sgst_percent: request.sgst_percent.unwrap_or(current.sgst_percent),
        };

        let revision = InvoiceDraft::from_invoice(&existing)
            .cleared()
            .with_charges(charges);
        let revision = build_items(&request.items, &settings)?
            .into_iter()
            .fold(revision, InvoiceDraft::with_item)
            .into_revision()?;

        self.invoice_repo.replace_items(existing.id, &revision).await?;

        tracing::info!(
            invoice_no = %existing.invoice_no,
            items = revision.items().len(),
            total = %revision.totals().total,
            "Invoice updated"
        );

        let invoice = Invoice {
            revision,
            ..existing
        };
        let customer = self.customer_repo.find_by_id(invoice.customer_id).await?;

        Ok(InvoiceResponse { invoice, customer })
    }

    /// Copy an invoice's items and charges under a new number, dated now
    pub async fn duplicate_invoice(&self, invoice_no: &str) -> Result<InvoiceResponse> {
        let source = self.require_invoice(invoice_no).await?;
        let new_number = self.number_generator.generate(self.invoice_repo.as_ref()).await?;

        let invoice = self
            .invoice_repo
            .create(&NewInvoice {
                invoice_no: new_number,
                customer_id: source.customer_id,
                date: Utc::now(),
                revision: source.revision.clone(),
            })
            .await?;

        tracing::info!(
            source = %source.invoice_no,
            invoice_no = %invoice.invoice_no,
            "Invoice duplicated"
        );

        let customer = self.customer_repo.find_by_id(invoice.customer_id).await?;
        Ok(InvoiceResponse { invoice, customer })
    }

    pub async fn delete_invoice(&self, invoice_no: &str) -> Result<()> {
        let number: InvoiceNumber = invoice_no.parse()?;

        if !self.invoice_repo.delete(&number).await? {
            return Err(AppError::not_found(format!("Invoice {} not found", number)));
        }

        tracing::info!(invoice_no = %number, "Invoice deleted");
        Ok(())
    }

    /// Every invoice with its items and customer, oldest first
    pub async fn export_json(&self) -> Result<Vec<InvoiceResponse>> {
        let customers: HashMap<i64, Customer> = self
            .customer_repo
            .list()
            .await?
            .into_iter()
            .map(|customer| (customer.id, customer))
            .collect();

        let mut invoices = self.invoice_repo.list_between(None, None).await?;
        invoices.reverse();

        Ok(invoices
            .into_iter()
            .map(|invoice| {
                let customer = customers.get(&invoice.customer_id).cloned();
                InvoiceResponse { invoice, customer }
            })
            .collect())
    }

    /// Import invoices from a JSON export.
    ///
    /// Each invoice is stored on its own; failures are reported as
    /// `Invoice N: ...` and skipped. Amounts are recomputed from item inputs.
    pub async fn import_json(&self, content: &str) -> Result<ImportReport> {
        let invoices: Vec<ImportedInvoice> = serde_json::from_str(content)
            .map_err(|e| AppError::validation(format!("Invalid invoice JSON: {}", e)))?;
        let mut report = ImportReport::default();

        for (index, imported) in invoices.into_iter().enumerate() {
            match self.import_one(imported).await {
                Ok(()) => report.imported += 1,
                Err(e) => report.errors.push(format!("Invoice {}: {}", index + 1, e)),
            }
        }

        tracing::info!(
            imported = report.imported,
            failed = report.errors.len(),
            "Invoice JSON import finished"
        );

        Ok(report)
    }

    async fn import_one(&self, imported: ImportedInvoice) -> Result<()> {
        if self.customer_repo.find_by_id(imported.customer_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Customer ID {} not found",
                imported.customer_id
            )));
        }

        let items = imported
            .items
            .into_iter()
            .map(|item| {
                LineItem::new(
                    item.metal,
                    item.weight,
                    item.rate,
                    item.wastage_percent,
                    item.making_percent,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let revision = InvoiceRevision::new(
            items,
            InvoiceCharges {
                discount_percent: imported.discount_percent,
                cgst_percent: imported.cgst_percent,
                sgst_percent: imported.sgst_percent,
            },
        )?;

        self.invoice_repo
            .create(&NewInvoice {
                invoice_no: imported.invoice_no.parse()?,
                customer_id: imported.customer_id,
                date: imported.date,
                revision,
            })
            .await?;

        Ok(())
    }

    async fn require_invoice(&self, invoice_no: &str) -> Result<Invoice> {
        let number: InvoiceNumber = invoice_no.parse()?;

        self.invoice_repo
            .find_by_number(&number)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice {} not found", number)))
    }

    async fn require_customer(&self, customer_id: i64) -> Result<Customer> {
        self.customer_repo
            .find_by_id(customer_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Customer {} not found", customer_id)))
    }
}

/// Refuse an empty item list before touching the store
fn ensure_has_items(items: &[LineItemInput]) -> Result<()> {
    if items.is_empty() {
        return Err(AppError::validation("Invoice must have at least one item"));
    }
    Ok(())
}

fn build_draft(inputs: &[LineItemInput], settings: &ShopSettings) -> Result<InvoiceDraft> {
    Ok(build_items(inputs, settings)?
        .into_iter()
        .fold(InvoiceDraft::new(), InvoiceDraft::with_item))
}

fn build_items(inputs: &[LineItemInput], settings: &ShopSettings) -> Result<Vec<LineItem>> {
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            resolve_line_item(input, settings).map_err(|e| match e {
                AppError::Validation(msg) => {
                    AppError::Validation(format!("Item {}: {}", index + 1, msg))
                }
                other => other,
            })
        })
        .collect()
}

/// Price one requested line, filling rate, wastage and making from the shop's
/// metal table where the request leaves them out.
///
/// Requested items must have a positive weight and rate; zero-valued lines
/// are only ever produced by imports of historical data.
pub fn resolve_line_item(input: &LineItemInput, settings: &ShopSettings) -> Result<LineItem> {
    let defaults = settings.metal_rate(&input.metal);

    let rate = match (input.rate, defaults) {
        (Some(rate), _) => rate,
        (None, Some(defaults)) => defaults.rate,
        (None, None) => {
            return Err(AppError::validation(format!(
                "No rate configured for metal '{}'; supply a rate",
                input.metal.trim()
            )))
        }
    };
    let wastage_percent = input
        .wastage_percent
        .or(defaults.map(|d| d.wastage_percent))
        .unwrap_or(Decimal::ZERO);
    let making_percent = input
        .making_percent
        .or(defaults.map(|d| d.making_percent))
        .unwrap_or(Decimal::ZERO);

    if input.weight <= Decimal::ZERO {
        return Err(AppError::validation(format!(
            "Weight must be greater than 0, got: {}",
            input.weight
        )));
    }

    if rate <= Decimal::ZERO {
        return Err(AppError::validation(format!(
            "Rate must be greater than 0, got: {}",
            rate
        )));
    }

    LineItem::new(
        input.metal.as_str(),
        input.weight,
        rate,
        wastage_percent,
        making_percent,
    )
}
