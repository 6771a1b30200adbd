use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::core::error::AppError;
use crate::middleware::auth::bearer_token;
use crate::middleware::RateLimiter;
use crate::modules::users::models::{
    ChangePasswordRequest, LoginRequest, Principal, ResetLookup, SignupRequest,
    UpdateProfileRequest,
};
use crate::modules::users::services::{AuthService, PasswordResetService};

/// Register a new account; it stays pending until an admin approves it
/// POST /auth/signup
pub async fn signup(
    service: web::Data<Arc<AuthService>>,
    request: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let user = service.signup(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// POST /auth/login
pub async fn login(
    service: web::Data<Arc<AuthService>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let response = service.login(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /auth/logout
pub async fn logout(
    service: web::Data<Arc<AuthService>>,
    _principal: Principal,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    if let Some(token) = bearer_token(&req) {
        service.logout(token).await?;
    }
    Ok(HttpResponse::NoContent().finish())
}

/// GET /auth/me
pub async fn me(
    service: web::Data<Arc<AuthService>>,
    principal: Principal,
) -> Result<HttpResponse, AppError> {
    let user = service.current_user(&principal).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// PUT /auth/password
pub async fn change_password(
    service: web::Data<Arc<AuthService>>,
    principal: Principal,
    request: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    service
        .change_password(&principal, request.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /auth/profile
pub async fn update_profile(
    service: web::Data<Arc<AuthService>>,
    principal: Principal,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let user = service
        .update_profile(&principal, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Ask an admin to reset a forgotten password or look up a username.
/// The response is the same whether or not an account matched.
/// POST /auth/password-reset
pub async fn request_password_reset(
    service: web::Data<Arc<PasswordResetService>>,
    request: web::Json<ResetLookup>,
) -> Result<HttpResponse, AppError> {
    service.submit(request.into_inner()).await?;
    Ok(HttpResponse::Accepted().json(serde_json::json!({
        "message": "If the account exists, an administrator will review the request"
    })))
}

/// Configure auth routes. Login and reset requests are throttled by
/// `login_limiter`.
pub fn configure(cfg: &mut web::ServiceConfig, login_limiter: RateLimiter) {
    cfg.service(
        web::scope("/auth")
            .route("/signup", web::post().to(signup))
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(login)),
            )
            .service(
                web::resource("/password-reset")
                    .wrap(login_limiter)
                    .route(web::post().to(request_password_reset)),
            )
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me))
            .route("/password", web::put().to(change_password))
            .route("/profile", web::put().to(update_profile)),
    );
}
