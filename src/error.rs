/*
 * Responsibility
 * - AssertionError: failures of the assertion pipeline and the token exchange
 * - AppError: HTTP-facing error with IntoResponse (status / JSON error body)
 * - AssertionError -> AppError mapping
 */
use std::path::PathBuf;
use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AssertionError {
    // Configuration: raised before any key is loaded or request is sent.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("complementary information overrides reserved claim '{0}'")]
    ReservedClaim(String),

    // Signing: key material or token serialization.
    #[error("failed to read signing key from {path}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load RSA signing key")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    #[error("failed to generate {token} token")]
    Signing {
        token: &'static str,
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    // Transport: the token endpoint could not be reached or refused the request.
    #[error("token endpoint returned HTTP {status}: {body}")]
    Transport {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("token request failed")]
    Http(#[from] reqwest::Error),

    #[error("token request timed out after {0:?}")]
    Timeout(Duration),

    // Response format: the body is not a token response.
    #[error("failed to deserialize the token response")]
    ResponseFormat(#[source] serde_json::Error),
}

impl AssertionError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::ReservedClaim(_))
    }

    pub fn is_signing(&self) -> bool {
        matches!(
            self,
            Self::KeyRead { .. } | Self::InvalidKey(_) | Self::Signing { .. }
        )
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Http(_) | Self::Timeout(_)
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },

    #[error("upstream error: {0}")]
    BadGateway(String),

    #[error("upstream timeout")]
    GatewayTimeout,

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::BadGateway(message) => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY", message),
            AppError::GatewayTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "GATEWAY_TIMEOUT",
                "upstream timeout".into(),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AssertionError> for AppError {
    fn from(e: AssertionError) -> Self {
        match e {
            AssertionError::ReservedClaim(name) => AppError::bad_request(
                "RESERVED_CLAIM",
                format!("'{name}' is a reserved claim"),
            ),
            AssertionError::Transport { status, .. } => {
                AppError::BadGateway(format!("token endpoint returned HTTP {status}"))
            }
            AssertionError::Http(_) => AppError::BadGateway("token endpoint unreachable".into()),
            AssertionError::ResponseFormat(_) => {
                AppError::BadGateway("malformed token response".into())
            }
            AssertionError::Timeout(_) => AppError::GatewayTimeout,
            // Configuration and signing failures are server-side problems.
            other => {
                error!(error = %other, "client assertion generation failed");
                AppError::Internal
            }
        }
    }
}
