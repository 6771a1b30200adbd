pub mod auth;
pub mod error_handler;
pub mod rate_limit;
pub mod request_id;

pub use auth::SessionAuth;
pub use error_handler::configure_extractors;
pub use rate_limit::RateLimiter;
pub use request_id::RequestId;
