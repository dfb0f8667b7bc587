use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::service::AuthService;
use crate::error::ApiError;

/// Endpoints reachable without a token. Everything else behind the guarded
/// scope requires a verified `Authorization: Bearer` header.
const PUBLIC_PATHS: [&str; 4] = [
    "/api/auth/signin",
    "/api/auth/signup",
    "/api/auth/check-username",
    "/api/auth/check-email",
];

/// Bearer-token guard for the `/api` scope. On success the verified [`Claims`]
/// are inserted into request extensions for the `AuthedUser` extractor;
/// on failure the request is rejected with 401 before reaching any handler.
///
/// [`Claims`]: crate::auth::token::Claims
pub struct AuthMiddleware {
    auth: AuthService,
}

impl AuthMiddleware {
    pub fn new(auth: AuthService) -> Self {
        Self { auth }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            auth: self.auth.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    auth: AuthService,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if PUBLIC_PATHS.contains(&req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match token {
            Some(token) => match self.auth.resolve_identity(token) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    let fut = self.service.call(req);
                    Box::pin(fut)
                }
                Err(err) => Box::pin(async move { Err(err.into()) }),
            },
            None => {
                let err = ApiError::Unauthenticated("Missing token".into());
                Box::pin(async move { Err(err.into()) })
            }
        }
    }
}
