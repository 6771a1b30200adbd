use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::invoices::models::{CreateInvoiceRequest, ReviseInvoiceRequest};
use crate::modules::invoices::services::InvoiceService;
use crate::modules::receipts;
use crate::modules::users::models::Principal;

/// Create an invoice
/// POST /invoices
pub async fn create_invoice(
    service: web::Data<Arc<InvoiceService>>,
    _principal: Principal,
    request: web::Json<CreateInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    let invoice = service.create_invoice(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(invoice))
}

/// Price an unsaved item list
/// POST /invoices/preview
pub async fn preview_invoice(
    service: web::Data<Arc<InvoiceService>>,
    _principal: Principal,
    request: web::Json<ReviseInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    let preview = service.preview_invoice(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(preview))
}

/// List invoices, newest first
/// GET /invoices
pub async fn list_invoices(
    service: web::Data<Arc<InvoiceService>>,
    _principal: Principal,
) -> Result<HttpResponse, AppError> {
    let invoices = service.list_invoices().await?;
    Ok(HttpResponse::Ok().json(invoices))
}

/// Get invoice with items and customer
/// GET /invoices/{invoice_no}
pub async fn get_invoice(
    service: web::Data<Arc<InvoiceService>>,
    _principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let invoice = service.get_invoice(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(invoice))
}

/// Replace an invoice's items and charges
/// PUT /invoices/{invoice_no}
pub async fn update_invoice(
    service: web::Data<Arc<InvoiceService>>,
    _principal: Principal,
    path: web::Path<String>,
    request: web::Json<ReviseInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    let invoice = service
        .update_invoice(&path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(invoice))
}

/// POST /invoices/{invoice_no}/duplicate
pub async fn duplicate_invoice(
    service: web::Data<Arc<InvoiceService>>,
    _principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let invoice = service.duplicate_invoice(&path.into_inner()).await?;
    Ok(HttpResponse::Created().json(invoice))
}

/// DELETE /invoices/{invoice_no}
pub async fn delete_invoice(
    service: web::Data<Arc<InvoiceService>>,
    _principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete_invoice(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// All invoices with items and customers
/// GET /invoices/export.json
pub async fn export_invoices(
    service: web::Data<Arc<InvoiceService>>,
    _principal: Principal,
) -> Result<HttpResponse, AppError> {
    let invoices = service.export_json().await?;

    Ok(HttpResponse::Ok()
        .insert_header(("Content-Disposition", "attachment; filename=\"invoices.json\""))
        .json(invoices))
}

/// Import invoices from a JSON export in the request body
/// POST /invoices/import
pub async fn import_invoices(
    service: web::Data<Arc<InvoiceService>>,
    _principal: Principal,
    body: String,
) -> Result<HttpResponse, AppError> {
    let report = service.import_json(&body).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Configure invoice routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/invoices")
            .route("", web::post().to(create_invoice))
            .route("", web::get().to(list_invoices))
            .route("/preview", web::post().to(preview_invoice))
            .route("/export.json", web::get().to(export_invoices))
            .route("/import", web::post().to(import_invoices))
            .configure(receipts::controllers::configure)
            .route("/{invoice_no}", web::get().to(get_invoice))
            .route("/{invoice_no}", web::put().to(update_invoice))
            .route("/{invoice_no}", web::delete().to(delete_invoice))
            .route("/{invoice_no}/duplicate", web::post().to(duplicate_invoice)),
    );
}
