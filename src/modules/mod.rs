pub mod backup;
pub mod customers;
pub mod health;
pub mod invoices;
pub mod receipts;
pub mod reports;
pub mod settings;
pub mod users;
