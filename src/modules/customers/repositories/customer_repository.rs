use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::core::{AppError, Result};
use crate::modules::customers::models::{Customer, NewCustomer};

/// Persistence for customers
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, customer: &NewCustomer) -> Result<Customer>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Customer>>;

    /// All customers, newest first
    async fn list(&self) -> Result<Vec<Customer>>;

    async fn update(&self, id: i64, customer: &NewCustomer) -> Result<Option<Customer>>;

    /// Delete a customer with all of their invoices and items.
    /// Returns false when the customer does not exist.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Every stored account number, input to the account-number generator
    async fn list_account_numbers(&self) -> Result<Vec<String>>;
}

pub struct SqliteCustomerRepository {
    pool: SqlitePool,
}

impl SqliteCustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Map a unique violation on the customers table to the field it concerns
fn map_customer_conflict(err: sqlx::Error) -> AppError {
    let on_account_no = err
        .as_database_error()
        .map(|db_err| db_err.message().contains("customers.account_no"))
        .unwrap_or(false);

    if on_account_no {
        AppError::on_unique_violation(err, "account number already exists")
    } else {
        AppError::on_unique_violation(err, "phone number already registered")
    }
}

#[async_trait]
impl CustomerRepository for SqliteCustomerRepository {
    async fn create(&self, customer: &NewCustomer) -> Result<Customer> {
        let id = sqlx::query(
            "INSERT INTO customers (account_no, name, phone, address) VALUES (?, ?, ?, ?)",
        )
        .bind(&customer.account_no)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.address)
        .execute(&self.pool)
        .await
        .map_err(map_customer_conflict)?
        .last_insert_rowid();

        Ok(Customer {
            id,
            account_no: Some(customer.account_no.clone()),
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone(),
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, account_no, name, phone, address FROM customers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn list(&self) -> Result<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id, account_no, name, phone, address FROM customers ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    async fn update(&self, id: i64, customer: &NewCustomer) -> Result<Option<Customer>> {
        let updated = sqlx::query(
            "UPDATE customers SET account_no = ?, name = ?, phone = ?, address = ? WHERE id = ?",
        )
        .bind(&customer.account_no)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_customer_conflict)?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM invoice_items WHERE invoice_id IN (SELECT id FROM invoices WHERE customer_id = ?)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM invoices WHERE customer_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(deleted.rows_affected() > 0)
    }

    async fn list_account_numbers(&self) -> Result<Vec<String>> {
        let numbers = sqlx::query_scalar::<_, String>(
            "SELECT account_no FROM customers WHERE account_no IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(numbers)
    }
}
