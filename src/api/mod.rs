//! HTTP surface of the gateway.

pub mod health;
pub mod payments;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::payments::providers::MpesaProvider;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub provider: Arc<MpesaProvider>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/payments/stk-push", post(payments::initiate_stk_push))
        .route("/payments/callback", post(payments::mpesa_callback))
        // Router::layer wraps outward, so the request id is set before
        // the trace span and propagated onto the response.
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
