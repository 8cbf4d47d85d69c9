/*
 * Responsibility
 * - request/response DTOs of /client-assertion
 * - validate() for the complementary information body
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::assertion::{ClientAssertion, ComplementaryInfo, Digest};

/// Body of `POST /client-assertion`: complementary information for the tracking evidence.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct CreateClientAssertionRequest(pub ComplementaryInfo);

impl CreateClientAssertionRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.0.keys().any(|k| k.trim().is_empty()) {
            return Err("complementary information keys must not be empty");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ClientAssertionResponse {
    pub client_assertion: String,
    pub token_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expiration: DateTime<Utc>,
    pub key_id: String,
    pub algorithm: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub issuer: String,
    pub subject: String,
    pub audience: String,
    pub purpose_id: String,
    pub digest: Digest,
}

impl From<ClientAssertion> for ClientAssertionResponse {
    fn from(a: ClientAssertion) -> Self {
        Self {
            client_assertion: a.assertion,
            token_id: a.token_id,
            issued_at: a.issued_at,
            expiration: a.expiration,
            key_id: a.key_id,
            algorithm: a.algorithm,
            token_type: a.token_type,
            issuer: a.issuer,
            subject: a.subject,
            audience: a.audience,
            purpose_id: a.purpose_id,
            digest: a.digest,
        }
    }
}

/// Query of `GET /client-assertion/token`.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    #[serde(rename = "clientAssertion")]
    pub client_assertion: String,
}
