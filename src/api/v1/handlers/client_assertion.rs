/*
 * Responsibility
 * - /client-assertion handlers (thin: DTO <-> OAuth2Service)
 * - Signing runs on the blocking pool (RSA + key file read)
 */
use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::error;

use crate::{
    api::v1::dto::client_assertion::{
        ClientAssertionResponse, CreateClientAssertionRequest, TokenQuery,
    },
    error::AppError,
    services::{
        assertion::{ClientAssertion, ComplementaryInfo},
        oauth2::{OAuth2Service, TokenResponse},
    },
    state::AppState,
};

pub async fn get_client_assertion(State(state): State<AppState>) -> Result<String, AppError> {
    let assertion = generate(state.oauth2, ComplementaryInfo::new()).await?;
    Ok(assertion.assertion)
}

pub async fn create_client_assertion(
    State(state): State<AppState>,
    Json(req): Json<CreateClientAssertionRequest>,
) -> Result<Json<ClientAssertionResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_COMPLEMENTARY_INFO", msg))?;

    let assertion = generate(state.oauth2, req.0).await?;
    Ok(Json(assertion.into()))
}

pub async fn get_token(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<TokenResponse>, AppError> {
    if query.client_assertion.trim().is_empty() {
        return Err(AppError::bad_request(
            "MISSING_CLIENT_ASSERTION",
            "clientAssertion is required",
        ));
    }

    let token = state
        .oauth2
        .request_access_token(&query.client_assertion)
        .await?;
    Ok(Json(token))
}

async fn generate(
    oauth2: Arc<dyn OAuth2Service>,
    info: ComplementaryInfo,
) -> Result<ClientAssertion, AppError> {
    let assertion = tokio::task::spawn_blocking(move || oauth2.generate_client_assertion_with(&info))
        .await
        .map_err(|e| {
            error!(error = %e, "client assertion task failed");
            AppError::Internal
        })??;
    Ok(assertion)
}
