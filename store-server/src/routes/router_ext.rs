//! Router extension for oneshot calls
//!
//! Lets tests and internal callers push a request through the full
//! middleware stack without binding a TCP listener.

use http::Response;
use tower::Service;

use crate::core::ServerState;
use anyhow::Result;
use axum::Router;
use axum::body::Body;
use http::Request;

/// Result type for oneshot API calls
pub type OneshotResult = Result<Response<Body>>;

/// Extension trait for Router to support oneshot calls
///
/// # Example
///
/// ```ignore
/// use http::Request;
///
/// let state = ServerState::initialize(&config).await;
/// let mut app = build_app(&state);
/// let request = Request::builder()
///     .uri("/health")
///     .body(Body::empty())?;
///
/// let response = app.oneshot(&state, request).await?;
/// ```
#[async_trait::async_trait]
pub trait OneshotRouter {
    /// Process a request without going through the network stack
    async fn oneshot(&mut self, state: &ServerState, request: Request<Body>) -> OneshotResult;
}

#[async_trait::async_trait]
impl OneshotRouter for Router<ServerState> {
    async fn oneshot(&mut self, state: &ServerState, request: Request<Body>) -> OneshotResult {
        // Clone router and apply state, then call as Service
        let mut svc = self.clone().with_state(state.clone());
        let response = svc.call(request).await?;
        Ok(response)
    }
}
