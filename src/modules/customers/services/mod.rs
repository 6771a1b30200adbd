pub mod account_number;
pub mod customer_service;

pub use account_number::generate_account_number;
pub use customer_service::CustomerService;
