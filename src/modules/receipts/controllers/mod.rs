pub mod receipt_controller;

pub use receipt_controller::configure;
