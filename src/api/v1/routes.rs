/*
 * Responsibility
 * - v1 URL layout
 * - /health, /client-assertion, /client-assertion/token
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{
    client_assertion::{create_client_assertion, get_client_assertion, get_token},
    health::health,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route(
            "/client-assertion",
            get(get_client_assertion).post(create_client_assertion),
        )
        .route("/client-assertion/token", get(get_token))
}
