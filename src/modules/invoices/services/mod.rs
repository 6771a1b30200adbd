pub mod invoice_aggregator;
pub mod invoice_service;
pub mod number_generator;
pub mod pricing_calculator;

pub use invoice_aggregator::compute_invoice_totals;
pub use invoice_service::InvoiceService;
pub use number_generator::{InvoiceNumberGenerator, InvoiceNumberRegistry};
pub use pricing_calculator::compute_line_item;
