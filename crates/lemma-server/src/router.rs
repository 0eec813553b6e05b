use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::resolve_login;
use crate::handler;
use crate::state::AppState;

/// Build the axum router with every Lemma Chain endpoint.
///
/// Paths not claimed by a named route resolve as chain addresses.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health))
        .route("/ref", post(handler::create_ref))
        .route("/accounts", post(handler::create_account))
        .route("/accounts/:name", get(handler::show_account))
        .route("/verify/", get(handler::verify))
        .route("/verify/:code", get(handler::verify))
        .route("/search/", get(handler::search))
        .route("/search/:terms", get(handler::search))
        .fallback(handler::resolve_chain)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_login))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("private"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
