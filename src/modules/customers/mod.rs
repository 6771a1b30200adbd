// Customers module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::Customer;
pub use repositories::{CustomerRepository, SqliteCustomerRepository};
pub use services::CustomerService;
