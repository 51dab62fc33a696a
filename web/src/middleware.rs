//! CORS that leaves plain `OPTIONS` requests to the router.
//!
//! `tower_http::cors::Cors` answers every `OPTIONS` request itself. Only a
//! request carrying `Access-Control-Request-Method` is a CORS preflight; any
//! other `OPTIONS` goes straight to the wrapped service, so `/api/todos`
//! answers it with 405 and an `Allow` header like every other unsupported
//! method.
//!
//! # Example
//!
//! ```ignore
//! use composable_todo_web::middleware::PreflightCorsLayer;
//!
//! let app = Router::new()
//!     .route("/api/todos", any(todos))
//!     .layer(PreflightCorsLayer::new(CorsLayer::permissive()));
//! ```

use axum::http::{Method, Request, Response, header};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use tower::{Layer, Service};
use tower_http::cors::{Cors, CorsLayer};

/// Layer that applies a [`CorsLayer`] to everything except non-preflight
/// `OPTIONS` requests.
#[derive(Clone, Debug)]
pub struct PreflightCorsLayer {
    cors: CorsLayer,
}

impl PreflightCorsLayer {
    /// Wrap a configured [`CorsLayer`].
    #[must_use]
    pub const fn new(cors: CorsLayer) -> Self {
        Self { cors }
    }
}

impl<S: Clone> Layer<S> for PreflightCorsLayer {
    type Service = PreflightCors<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PreflightCors {
            cors: self.cors.layer(inner.clone()),
            inner,
        }
    }
}

/// Middleware service built by [`PreflightCorsLayer`].
#[derive(Clone, Debug)]
pub struct PreflightCors<S> {
    inner: S,
    cors: Cors<S>,
}

/// Whether `request` is an `OPTIONS` request that is not a CORS preflight.
#[must_use]
pub fn is_plain_options<B>(request: &Request<B>) -> bool {
    request.method() == Method::OPTIONS
        && !request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for PreflightCors<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    ResBody: Default,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        ready!(self.inner.poll_ready(cx))?;
        self.cors.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        if is_plain_options(&request) {
            Box::pin(self.inner.call(request))
        } else {
            Box::pin(self.cors.call(request))
        }
    }
}
