use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::customers::models::{CreateCustomerRequest, UpdateCustomerRequest};
use crate::modules::customers::services::CustomerService;
use crate::modules::users::models::Principal;

/// Create a customer
/// POST /customers
pub async fn create_customer(
    service: web::Data<Arc<CustomerService>>,
    _principal: Principal,
    request: web::Json<CreateCustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let customer = service.create_customer(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(customer))
}

/// List customers, newest first
/// GET /customers
pub async fn list_customers(
    service: web::Data<Arc<CustomerService>>,
    _principal: Principal,
) -> Result<HttpResponse, AppError> {
    let customers = service.list_customers().await?;
    Ok(HttpResponse::Ok().json(customers))
}

/// GET /customers/{id}
pub async fn get_customer(
    service: web::Data<Arc<CustomerService>>,
    _principal: Principal,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let customer = service.get_customer(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(customer))
}

/// PUT /customers/{id}
pub async fn update_customer(
    service: web::Data<Arc<CustomerService>>,
    _principal: Principal,
    path: web::Path<i64>,
    request: web::Json<UpdateCustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let customer = service
        .update_customer(path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(customer))
}

/// Delete a customer and their invoices
/// DELETE /customers/{id}
pub async fn delete_customer(
    service: web::Data<Arc<CustomerService>>,
    _principal: Principal,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    service.delete_customer(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /customers/export.csv
pub async fn export_customers(
    service: web::Data<Arc<CustomerService>>,
    _principal: Principal,
) -> Result<HttpResponse, AppError> {
    let csv = service.export_csv().await?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(("Content-Disposition", "attachment; filename=\"customers.csv\""))
        .body(csv))
}

/// Import customers from a CSV request body
/// POST /customers/import
pub async fn import_customers(
    service: web::Data<Arc<CustomerService>>,
    _principal: Principal,
    body: String,
) -> Result<HttpResponse, AppError> {
    let report = service.import_csv(&body).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Configure customer routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/customers")
            .route("", web::post().to(create_customer))
            .route("", web::get().to(list_customers))
            .route("/export.csv", web::get().to(export_customers))
            .route("/import", web::post().to(import_customers))
            .route("/{id}", web::get().to(get_customer))
            .route("/{id}", web::put().to(update_customer))
            .route("/{id}", web::delete().to(delete_customer)),
    );
}
