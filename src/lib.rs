use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod processor;
pub mod webhook_auth;

use config::CheckoutSettings;
use processor::PaymentProcessor;
use webhook_auth::{ver_sig, VerifySigState};

#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<dyn PaymentProcessor>,
    pub checkout: Arc<CheckoutSettings>,
}

/// Builds the public router. With a `webhook_secret`, webhook bodies must carry a valid signature.
pub fn create_routes(state: AppState, webhook_secret: Option<String>) -> Router {
    let webhook = match webhook_secret {
        Some(hmac_secret) => post(handlers::paypal_webhook)
            .route_layer(from_fn_with_state(VerifySigState { hmac_secret }, ver_sig)),
        None => post(handlers::paypal_webhook),
    };

    Router::new()
        .route("/create-order", post(handlers::create_order))
        // the processor redirects to the bare path, storefronts link the slashed one
        .route("/execute-payment", get(handlers::execute_payment))
        .route("/execute-payment/", get(handlers::execute_payment))
        .route("/paypal/webhook", webhook)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
