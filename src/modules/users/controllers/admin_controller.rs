use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::users::models::{
    ChangeRoleRequest, CreateUserRequest, Principal, ResolveResetRequest, SetPasswordRequest,
};
use crate::modules::users::services::{PasswordResetService, UserService};

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub pending: bool,
}

/// List users, or only pending sign-ups with `?pending=true`
/// GET /admin/users
pub async fn list_users(
    service: web::Data<Arc<UserService>>,
    principal: Principal,
    query: web::Query<ListUsersQuery>,
) -> Result<HttpResponse, AppError> {
    let users = if query.pending {
        service.list_pending(&principal).await?
    } else {
        service.list_users(&principal).await?
    };
    Ok(HttpResponse::Ok().json(users))
}

/// POST /admin/users
pub async fn create_user(
    service: web::Data<Arc<UserService>>,
    principal: Principal,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let user = service.create_user(&principal, request.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// POST /admin/users/{id}/approve
pub async fn approve_user(
    service: web::Data<Arc<UserService>>,
    principal: Principal,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user = service.approve_user(&principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// POST /admin/users/{id}/reject
pub async fn reject_user(
    service: web::Data<Arc<UserService>>,
    principal: Principal,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    service.reject_user(&principal, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /admin/users/{id}/role
pub async fn change_role(
    service: web::Data<Arc<UserService>>,
    principal: Principal,
    path: web::Path<i64>,
    request: web::Json<ChangeRoleRequest>,
) -> Result<HttpResponse, AppError> {
    let user = service
        .change_role(&principal, path.into_inner(), request.role)
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Set a new password for a user and end their sessions
/// PUT /admin/users/{id}/password
pub async fn reset_password(
    service: web::Data<Arc<UserService>>,
    principal: Principal,
    path: web::Path<i64>,
    request: web::Json<SetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    service
        .reset_password(&principal, path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Pending reset requests, newest first
/// GET /admin/password-resets
pub async fn list_reset_requests(
    service: web::Data<Arc<PasswordResetService>>,
    principal: Principal,
) -> Result<HttpResponse, AppError> {
    let requests = service.list_pending(&principal).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// POST /admin/password-resets/{id}/resolve
pub async fn resolve_reset_request(
    service: web::Data<Arc<PasswordResetService>>,
    principal: Principal,
    path: web::Path<i64>,
    request: web::Json<ResolveResetRequest>,
) -> Result<HttpResponse, AppError> {
    let resolved = service
        .resolve(&principal, path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(resolved))
}

/// POST /admin/password-resets/{id}/reject
pub async fn reject_reset_request(
    service: web::Data<Arc<PasswordResetService>>,
    principal: Principal,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let rejected = service.reject(&principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rejected))
}

/// Configure admin routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/users")
            .route("", web::get().to(list_users))
            .route("", web::post().to(create_user))
            .route("/{id}/approve", web::post().to(approve_user))
            .route("/{id}/reject", web::post().to(reject_user))
            .route("/{id}/role", web::put().to(change_role))
            .route("/{id}/password", web::put().to(reset_password)),
    )
    .service(
        web::scope("/admin/password-resets")
            .route("", web::get().to(list_reset_requests))
            .route("/{id}/resolve", web::post().to(resolve_reset_request))
            .route("/{id}/reject", web::post().to(reject_reset_request)),
    );
}
