use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError},
    web, Error, HttpRequest,
};

use crate::core::AppError;

/// Malformed JSON bodies render as validation errors in the usual envelope
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    tracing::warn!(path = %req.path(), "Rejected JSON body: {}", err);
    AppError::validation(format!("Invalid request body: {}", err)).into()
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> Error {
    tracing::warn!(path = %req.path(), "Rejected query string: {}", err);
    AppError::validation(format!("Invalid query parameters: {}", err)).into()
}

pub fn path_error_handler(err: PathError, req: &HttpRequest) -> Error {
    tracing::warn!(path = %req.path(), "Rejected path parameters: {}", err);
    AppError::validation(format!("Invalid path parameters: {}", err)).into()
}

/// Extractor configs wired to the handlers above
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        // CSV and JSON imports arrive as plain bodies
        .app_data(web::PayloadConfig::new(8 * 1024 * 1024));
}
