use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// A shop customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub account_no: Option<String>,
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// Validated customer fields ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub account_no: String,
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// Request to create a customer. The account number is generated when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    #[serde(default)]
    pub account_no: Option<String>,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Request to update a customer's details. A blank or missing account
/// number keeps the current one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCustomerRequest {
    #[serde(default)]
    pub account_no: Option<String>,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// One row of the customer CSV file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCsvRow {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub account_no: Option<String>,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl From<Customer> for CustomerCsvRow {
    fn from(customer: Customer) -> Self {
        Self {
            id: Some(customer.id),
            account_no: customer.account_no,
            name: customer.name,
            phone: customer.phone,
            address: Some(customer.address),
        }
    }
}

/// Phone numbers are exactly 10 ASCII digits
pub fn validate_phone(phone: &str) -> Result<()> {
    if phone.len() != 10 || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::validation(format!(
            "Phone number must be exactly 10 digits, got: '{}'",
            phone
        )));
    }

    Ok(())
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Customer name cannot be empty"));
    }

    if name.len() > 200 {
        return Err(AppError::validation("Customer name cannot exceed 200 characters"));
    }

    Ok(())
}

impl NewCustomer {
    /// Trim and validate customer fields
    pub fn new(
        account_no: impl Into<String>,
        name: &str,
        phone: &str,
        address: Option<&str>,
    ) -> Result<Self> {
        let account_no = account_no.into().trim().to_string();
        if account_no.is_empty() {
            return Err(AppError::validation("Account number cannot be empty"));
        }

        let name = name.trim();
        validate_name(name)?;

        let phone = phone.trim();
        validate_phone(phone)?;

        Ok(Self {
            account_no,
            name: name.to_string(),
            phone: phone.to_string(),
            address: address.unwrap_or_default().trim().to_string(),
        })
    }
}
