use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::invoices::models::InvoiceResponse;
use crate::modules::invoices::services::InvoiceService;
use crate::modules::receipts::services::{render_a4, render_thermal};
use crate::modules::users::models::Principal;

type Renderer = fn(&InvoiceResponse) -> crate::core::Result<Vec<u8>>;

fn a4(response: &InvoiceResponse) -> crate::core::Result<Vec<u8>> {
    render_a4(&response.invoice, response.customer.as_ref())
}

fn thermal(response: &InvoiceResponse) -> crate::core::Result<Vec<u8>> {
    render_thermal(&response.invoice, response.customer.as_ref())
}

async fn pdf_response(
    service: &InvoiceService,
    invoice_no: &str,
    filename_suffix: &str,
    render: Renderer,
) -> Result<HttpResponse, AppError> {
    let response = service.get_invoice(invoice_no).await?;
    let filename = format!("{}{}.pdf", response.invoice.invoice_no, filename_suffix);

    // Layout is CPU-bound, keep it off the async workers
    let bytes = web::block(move || render(&response))
        .await
        .map_err(|e| AppError::internal(format!("PDF rendering was cancelled: {}", e)))??;

    tracing::debug!(invoice_no = %invoice_no, size = bytes.len(), "Rendered receipt");

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            format!("inline; filename=\"{}\"", filename),
        ))
        .body(bytes))
}

/// A4 invoice PDF
/// GET /invoices/{invoice_no}/pdf
pub async fn invoice_pdf(
    service: web::Data<Arc<InvoiceService>>,
    _principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    pdf_response(&service, &path.into_inner(), "", a4).await
}

/// 80 mm thermal receipt PDF
/// GET /invoices/{invoice_no}/thermal.pdf
pub async fn thermal_pdf(
    service: web::Data<Arc<InvoiceService>>,
    _principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    pdf_response(&service, &path.into_inner(), "-thermal", thermal).await
}

/// Receipt routes, mounted inside the `/invoices` scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/{invoice_no}/pdf", web::get().to(invoice_pdf))
        .route("/{invoice_no}/thermal.pdf", web::get().to(thermal_pdf));
}
