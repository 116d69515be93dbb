use axum::http::StatusCode;
use axum::routing::get;
use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::integration::Env;
use crate::state::AppState;

pub mod auth;
pub mod chat;
pub mod error;
pub mod integration;
pub mod message;
pub mod state;
pub mod user;

pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;

pub fn app(state: AppState, env: &Env) -> Router {
    let api = Router::new()
        .merge(message::api(state.clone()))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::middleware::authorize,
        ));

    Router::new()
        .nest("/api", api)
        .route("/health", get(|| async { StatusCode::OK }))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(env.allow_origin())
                    .allow_methods(env.allow_methods())
                    .allow_headers(env.allow_headers()),
            ),
        )
}
