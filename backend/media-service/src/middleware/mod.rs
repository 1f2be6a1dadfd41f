/// HTTP middleware for media-service
///
/// JWT authentication reads the `access_token` cookie first (the login flow
/// stores tokens in HttpOnly cookies) and falls back to an Authorization
/// bearer header. Every failure produces the same 401 body:
/// `{"detail": "Authentication credentials were not provided."}`.
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::ResponseError;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use auth_token::{JwtKeys, TOKEN_TYPE_ACCESS};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use uuid::Uuid;

use crate::error::AppError;

/// Authenticated principal attached to the request.
#[derive(Debug, Clone)]
pub struct UserId(pub Uuid);

pub struct JwtAuthMiddleware {
    keys: JwtKeys,
}

impl JwtAuthMiddleware {
    pub fn new(keys: JwtKeys) -> Self {
        Self { keys }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            keys: self.keys.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    keys: JwtKeys,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let keys = self.keys.clone();

        Box::pin(async move {
            let Some(token) = raw_token(&req) else {
                return Ok(unauthorized(req));
            };

            let user_id = keys
                .validate_token_of_type(&token, TOKEN_TYPE_ACCESS)
                .ok()
                .and_then(|claims| claims.user_id().ok());
            let Some(user_id) = user_id else {
                return Ok(unauthorized(req));
            };

            req.extensions_mut().insert(UserId(user_id));

            service
                .call(req)
                .await
                .map(|res| res.map_into_left_body())
        })
    }
}

/// Early 401 response, bypassing the wrapped service entirely.
fn unauthorized<B>(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
    let (request, _payload) = req.into_parts();
    let response = AppError::Unauthorized.error_response().map_into_right_body();
    ServiceResponse::new(request, response)
}

fn raw_token(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.cookie("access_token") {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserId>()
                .cloned()
                .ok_or_else(|| AppError::Unauthorized.into()),
        )
    }
}
