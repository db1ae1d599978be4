use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::time::Instant;
use tracing::Instrument;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Id of the request being served on this task, if any.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// Request logging middleware
///
/// Runs every request inside an `http_request` span with its own
/// `request_id`, and logs the outcome with status and latency. The same id
/// is echoed in the `x-request-id` header and used as the `error_id` of
/// error bodies.
pub struct LoggerMiddleware;

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "http_request",
            request_id = %request_id,
            method = %req.method(),
            path = %req.path(),
        );

        let service = self.service.clone();
        let header_value = HeaderValue::from_str(&request_id).ok();

        Box::pin(REQUEST_ID.scope(
            request_id,
            async move {
                let mut result = service.call(req).await;
                let elapsed_ms = start_time.elapsed().as_millis() as u64;

                match &mut result {
                    Ok(res) => {
                        if let Some(value) = header_value {
                            res.headers_mut()
                                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
                        }
                        let status = res.status().as_u16();
                        if res.status().is_server_error() {
                            tracing::error!(status, elapsed_ms, "Request failed");
                        } else {
                            tracing::info!(status, elapsed_ms, "Request completed");
                        }
                    }
                    Err(e) => {
                        let status = e.as_response_error().status_code().as_u16();
                        tracing::warn!(status, elapsed_ms, error = %e, "Request rejected");
                    }
                }

                result
            }
            .instrument(span),
        ))
    }
}
