use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AssertionError;

/// Token endpoint reply (voucher).
///
/// Wire names are fixed: `token_type`, `expires_in`, `access_token`. Missing fields fall back
/// to empty values; an empty object (or `null`) is a valid, empty response.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    pub token_type: String,
    /// Seconds until expiry, passed through as sent.
    pub expires_in: i64,
    pub access_token: String,
}

impl TokenResponse {
    pub fn parse(body: &str) -> Result<Self, AssertionError> {
        let parsed: Option<Self> =
            serde_json::from_str(body).map_err(AssertionError::ResponseFormat)?;
        Ok(parsed.unwrap_or_default())
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field(
                "access_token",
                &format_args!("<{} bytes>", self.access_token.len()),
            )
            .finish()
    }
}
