// Shared helpers for integration and contract tests.
//
// Each test binary pulls these in with `#[path = "../helpers/mod.rs"]`, so
// not every helper is used by every binary.
#![allow(dead_code)]

pub mod test_data;
pub mod test_database;

pub use test_data::*;
pub use test_database::*;
pub use test_server::*;
