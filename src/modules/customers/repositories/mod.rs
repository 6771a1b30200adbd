pub mod customer_repository;

pub use customer_repository::{CustomerRepository, SqliteCustomerRepository};
