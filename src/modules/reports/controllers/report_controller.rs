use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::reports::models::DateRangeQuery;
use crate::modules::reports::services::ReportService;
use crate::modules::users::models::Principal;

/// Query parameters for the customer analysis endpoint
#[derive(Debug, Deserialize)]
pub struct CustomerAnalysisQuery {
    #[serde(default)]
    pub customer_id: Option<i64>,
}

/// Sales over an optional `[start_date, end_date)` range (YYYY-MM-DD)
/// GET /reports/sales
pub async fn sales_report(
    service: web::Data<Arc<ReportService>>,
    _principal: Principal,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    let report = service.sales_report(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// GET /reports/customers
pub async fn customer_analysis(
    service: web::Data<Arc<ReportService>>,
    _principal: Principal,
    query: web::Query<CustomerAnalysisQuery>,
) -> Result<HttpResponse, AppError> {
    let analysis = service.customer_analysis(query.customer_id).await?;
    Ok(HttpResponse::Ok().json(analysis))
}

/// GET /reports/categories
pub async fn category_report(
    service: web::Data<Arc<ReportService>>,
    _principal: Principal,
) -> Result<HttpResponse, AppError> {
    let report = service.category_report().await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Configure routes for reports module
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("/sales", web::get().to(sales_report))
            .route("/customers", web::get().to(customer_analysis))
            .route("/categories", web::get().to(category_report)),
    );
}
