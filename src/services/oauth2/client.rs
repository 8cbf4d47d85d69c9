use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, error};

use crate::error::AssertionError;
use crate::services::oauth2::token_request::TokenRequest;
use crate::services::oauth2::token_response::TokenResponse;

/// HTTP client for the authorization server token endpoint.
///
/// One POST per call; no retry. An optional deadline bounds the whole exchange.
#[derive(Clone, Debug)]
pub struct TokenClient {
    http: reqwest::Client,
    server_url: String,
    timeout: Option<Duration>,
}

impl TokenClient {
    pub fn new(server_url: impl Into<String>) -> Result<Self, AssertionError> {
        let http = reqwest::Client::builder().build().map_err(|e| {
            error!(error = %e, "failed to build HTTP client");
            AssertionError::Http(e)
        })?;
        Ok(Self::with_client(http, server_url))
    }

    pub fn with_client(http: reqwest::Client, server_url: impl Into<String>) -> Self {
        Self {
            http,
            server_url: server_url.into(),
            timeout: None,
        }
    }

    /// Bound every exchange issued by this client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// POST the request to the token endpoint and parse the reply.
    pub async fn request_access_token(
        &self,
        request: &TokenRequest,
    ) -> Result<TokenResponse, AssertionError> {
        match self.timeout {
            Some(deadline) => self.request_access_token_within(request, deadline).await,
            None => self.exchange(request).await,
        }
    }

    /// Same as `request_access_token`, failing with `Timeout` once `deadline` elapses.
    pub async fn request_access_token_within(
        &self,
        request: &TokenRequest,
        deadline: Duration,
    ) -> Result<TokenResponse, AssertionError> {
        tokio::time::timeout(deadline, self.exchange(request))
            .await
            .map_err(|_| {
                error!(server_url = %self.server_url, ?deadline, "token request timed out");
                AssertionError::Timeout(deadline)
            })?
    }

    async fn exchange(&self, request: &TokenRequest) -> Result<TokenResponse, AssertionError> {
        debug!(
            server_url = %self.server_url,
            client_id = request.client_id(),
            "requesting access token"
        );

        let response = self
            .http
            .post(&self.server_url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(request.encode())
            .send()
            .await
            .map_err(|e| {
                error!(server_url = %self.server_url, error = %e, "token request failed");
                AssertionError::Http(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(status = %status, error = %e, "failed to read token response body");
            AssertionError::Http(e)
        })?;

        if !status.is_success() {
            error!(
                status = %status,
                body_len = body.len(),
                "token endpoint rejected the request"
            );
            return Err(AssertionError::Transport { status, body });
        }

        let token = TokenResponse::parse(&body).inspect_err(|e| {
            error!(status = %status, error = %e, "failed to parse token response");
        })?;

        debug!(
            token_type = %token.token_type,
            expires_in = token.expires_in,
            empty = token.is_empty(),
            "access token received"
        );

        Ok(token)
    }
}
