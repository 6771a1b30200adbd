use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::settings::models::UpdateSettingsRequest;
use crate::modules::settings::services::SettingsService;
use crate::modules::users::models::Principal;

/// GET /settings
pub async fn get_settings(
    service: web::Data<Arc<SettingsService>>,
    _principal: Principal,
) -> Result<HttpResponse, AppError> {
    let settings = service.get_settings().await?;
    Ok(HttpResponse::Ok().json(settings))
}

/// Admin only
/// PUT /settings
pub async fn update_settings(
    service: web::Data<Arc<SettingsService>>,
    principal: Principal,
    request: web::Json<UpdateSettingsRequest>,
) -> Result<HttpResponse, AppError> {
    principal.require_admin()?;
    let settings = service.update_settings(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(settings))
}

/// Admin only
/// POST /settings/reset
pub async fn reset_settings(
    service: web::Data<Arc<SettingsService>>,
    principal: Principal,
) -> Result<HttpResponse, AppError> {
    principal.require_admin()?;
    let settings = service.reset_settings().await?;
    Ok(HttpResponse::Ok().json(settings))
}

/// Configure settings routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/settings")
            .route("", web::get().to(get_settings))
            .route("", web::put().to(update_settings))
            .route("/reset", web::post().to(reset_settings)),
    );
}
