use axum::{Router, routing::post};
use tower_http::trace::TraceLayer;

use crate::{
    email::send_otp_email,
    rpc::{call_procedure, reject_method, unmatched},
    state::AppState,
};

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api", post(call_procedure).fallback(reject_method))
        .route("/api/email", post(send_otp_email).fallback(reject_method))
        .fallback(unmatched)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
