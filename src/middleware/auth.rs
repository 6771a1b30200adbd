use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    body::{BoxBody, EitherBody},
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::LocalBoxFuture;

use crate::core::AppError;
use crate::modules::users::models::Principal;
use crate::modules::users::services::AuthService;

/// Bearer-token session middleware.
///
/// Requests carrying `Authorization: Bearer <token>` are resolved to a
/// [`Principal`] stored in the request extensions. An invalid or expired
/// token is answered with a `401` error envelope before the handler runs.
/// Requests without the header pass through and are refused later by any
/// handler that extracts a `Principal`.
pub struct SessionAuth {
    auth: Arc<AuthService>,
}

impl SessionAuth {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<BoxBody, B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthMiddleware {
            service: Rc::new(service),
            auth: self.auth.clone(),
        }))
    }
}

pub struct SessionAuthMiddleware<S> {
    service: Rc<S>,
    auth: Arc<AuthService>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<BoxBody, B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let auth = self.auth.clone();

        Box::pin(async move {
            let token = bearer_token(req.request()).map(str::to_string);

            if let Some(token) = token {
                match auth.authenticate(&token).await {
                    Ok(principal) => {
                        req.extensions_mut().insert(principal);
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "Rejected bearer token");
                        let response = err.error_response();
                        return Ok(req.into_response(response).map_into_left_body());
                    }
                }
            }

            svc.call(req).await.map(|res| res.map_into_right_body())
        })
    }
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequest for Principal {
    type Error = AppError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Principal>()
                .cloned()
                .ok_or_else(|| AppError::unauthorized("authentication required")),
        )
    }
}
