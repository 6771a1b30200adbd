use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::core::error::AppError;
use crate::core::timezone::to_shop_time;
use crate::modules::backup::services::BackupService;
use crate::modules::users::models::Principal;

/// Download a SQLite snapshot of the whole database
/// GET /admin/backup
pub async fn download_backup(
    service: web::Data<Arc<BackupService>>,
    principal: Principal,
) -> Result<HttpResponse, AppError> {
    let bytes = service.export(&principal).await?;
    let file_name = format!(
        "jewelcalc-backup-{}.db",
        to_shop_time(Utc::now()).format("%Y%m%d-%H%M%S")
    );

    Ok(HttpResponse::Ok()
        .content_type("application/vnd.sqlite3")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", file_name),
        ))
        .body(bytes))
}

/// Replace customers, invoices and settings from an uploaded backup file
/// POST /admin/restore
pub async fn restore_backup(
    service: web::Data<Arc<BackupService>>,
    principal: Principal,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let report = service.restore(&principal, &body).await?;
    Ok(HttpResponse::Ok().json(report))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/admin/backup", web::get().to(download_backup))
        .route("/admin/restore", web::post().to(restore_backup));
}
