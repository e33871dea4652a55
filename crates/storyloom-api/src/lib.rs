//! Storyloom API library: configuration, state, error mapping and routes,
//! shared by the server binary and the integration tests.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the full application router without middleware layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/admins", routes::admin::router())
        .nest("/api/v1/chapters", routes::chapter::router())
        .nest("/api/v1/requests", routes::request::router())
        .nest("/api/v1/characters", routes::character::router())
        .with_state(state)
}
