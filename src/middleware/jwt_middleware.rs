/// JWT Authentication Middleware
///
/// Validates the bearer token on every request to the resource it wraps and
/// attaches an `AuthContext` to the request extensions. Requests without a
/// valid token are answered with a 401 and never reach the handler.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::{AuthContext, TokenValidator};
use crate::error::{AppError, AuthError};

/// Fallback header carrying the raw token
const TOKEN_HEADER: &str = "token";

pub struct JwtMiddleware {
    validator: Arc<TokenValidator>,
}

impl JwtMiddleware {
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self { validator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            validator: self.validator.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    validator: Arc<TokenValidator>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
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
        let token = match extract_token(req.headers()) {
            Some(token) => token,
            None => {
                tracing::warn!(path = %req.path(), "Missing or invalid authorization header");
                return reject(req, AuthError::MissingToken);
            }
        };

        match self.validator.validate(&token) {
            Ok(claims) => {
                let context = AuthContext::from(&claims);
                tracing::debug!(
                    user_id = %context.user_id,
                    role = %context.role,
                    "JWT validated successfully"
                );
                req.extensions_mut().insert(context);

                let service = self.service.clone();
                Box::pin(async move {
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                })
            }
            Err(reason) => {
                tracing::warn!(path = %req.path(), reason = %reason, "JWT validation failed");
                reject(req, AuthError::InvalidToken(reason))
            }
        }
    }
}

fn reject<B: 'static>(
    req: ServiceRequest,
    error: AuthError,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
    let response = req
        .error_response(AppError::Auth(error))
        .map_into_right_body();
    Box::pin(async move { Ok(response) })
}

/// `Authorization: Bearer <token>`, else the raw `token` header.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value.to_str().ok()?;
        let token = value.strip_prefix("Bearer ")?.trim();
        return (!token.is_empty()).then(|| token.to_string());
    }

    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
