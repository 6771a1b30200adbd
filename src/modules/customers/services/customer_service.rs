use std::sync::Arc;

use crate::core::{AppError, Result};
use crate::modules::customers::models::{
    CreateCustomerRequest, Customer, CustomerCsvRow, NewCustomer, UpdateCustomerRequest,
};
use crate::modules::customers::repositories::CustomerRepository;
use crate::modules::customers::services::account_number::generate_account_number;
use crate::modules::invoices::models::ImportReport;

/// Service for customer records and their CSV exchange format
pub struct CustomerService {
    repo: Arc<dyn CustomerRepository>,
}

impl CustomerService {
    pub fn new(repo: Arc<dyn CustomerRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_customer(&self, request: CreateCustomerRequest) -> Result<Customer> {
        let account_no = match request.account_no.filter(|no| !no.trim().is_empty()) {
            Some(account_no) => account_no,
            None => self.next_account_number().await?,
        };

        let customer = NewCustomer::new(
            account_no,
            &request.name,
            &request.phone,
            request.address.as_deref(),
        )?;
        let created = self.repo.create(&customer).await?;

        tracing::info!(
            customer_id = created.id,
            account_no = %customer.account_no,
            "Customer created"
        );

        Ok(created)
    }

    pub async fn get_customer(&self, id: i64) -> Result<Customer> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Customer {} not found", id)))
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        self.repo.list().await
    }

    /// Replace a customer's details. Without a new account number the current
    /// one is kept, or one is assigned if the customer never had one. Taking
    /// another customer's number is a `Conflict`.
    pub async fn update_customer(&self, id: i64, request: UpdateCustomerRequest) -> Result<Customer> {
        let existing = self.get_customer(id).await?;
        let requested = request.account_no.filter(|no| !no.trim().is_empty());
        let account_no = match (requested, existing.account_no) {
            (Some(account_no), _) | (None, Some(account_no)) => account_no,
            (None, None) => self.next_account_number().await?,
        };

        let customer = NewCustomer::new(
            account_no,
            &request.name,
            &request.phone,
            request.address.as_deref(),
        )?;

        self.repo
            .update(id, &customer)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Customer {} not found", id)))
    }

    /// Delete a customer together with every invoice issued to them
    pub async fn delete_customer(&self, id: i64) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found(format!("Customer {} not found", id)));
        }

        tracing::info!(customer_id = id, "Customer deleted with their invoices");
        Ok(())
    }

    /// All customers as CSV with header `id,account_no,name,phone,address`
    pub async fn export_csv(&self) -> Result<String> {
        let mut customers = self.repo.list().await?;
        customers.sort_by_key(|customer| customer.id);

        let mut writer = csv::Writer::from_writer(vec![]);
        for customer in customers {
            writer.serialize(CustomerCsvRow::from(customer))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::internal(format!("Failed to flush CSV: {}", e)))?;

        String::from_utf8(bytes).map_err(|e| AppError::internal(format!("CSV is not UTF-8: {}", e)))
    }

    /// Insert customers from CSV one row at a time.
    ///
    /// Rows that fail to parse or validate, or that collide with an existing
    /// phone or account number, are reported as `Row N: ...` and skipped.
    /// The `id` column is ignored.
    pub async fn import_csv(&self, content: &str) -> Result<ImportReport> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut account_numbers = self.repo.list_account_numbers().await?;
        let mut report = ImportReport::default();

        for (index, record) in reader.deserialize::<CustomerCsvRow>().enumerate() {
            let row_no = index + 1;

            let outcome = match record {
                Ok(row) => self.import_row(row, &mut account_numbers).await,
                Err(e) => Err(AppError::from(e)),
            };

            match outcome {
                Ok(()) => report.imported += 1,
                Err(e) => report.errors.push(format!("Row {}: {}", row_no, e)),
            }
        }

        tracing::info!(
            imported = report.imported,
            failed = report.errors.len(),
            "Customer CSV import finished"
        );

        Ok(report)
    }

    async fn import_row(&self, row: CustomerCsvRow, account_numbers: &mut Vec<String>) -> Result<()> {
        let account_no = match row.account_no.filter(|no| !no.is_empty()) {
            Some(account_no) => account_no,
            None => generate_account_number(account_numbers),
        };

        let customer = NewCustomer::new(account_no, &row.name, &row.phone, row.address.as_deref())?;
        self.repo.create(&customer).await?;
        account_numbers.push(customer.account_no);

        Ok(())
    }

    async fn next_account_number(&self) -> Result<String> {
        let existing = self.repo.list_account_numbers().await?;
        Ok(generate_account_number(&existing))
    }
}
