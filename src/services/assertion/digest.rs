use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest as _, Sha256};

use crate::services::assertion::consts::digest::{ALG, SHA_256, VALUE};

/// `digest` claim value binding the tracking evidence into the client assertion.
///
/// Serializes as `{"alg":"SHA-256","value":"<64 lowercase hex chars>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub alg: String,
    pub value: String,
}

impl Digest {
    /// SHA-256 over the UTF-8 bytes of the compact evidence token.
    pub fn of_evidence(evidence: &str) -> Self {
        let hash = Sha256::digest(evidence.as_bytes());
        Self {
            alg: SHA_256.to_string(),
            value: hex::encode(hash),
        }
    }

    pub fn to_claim(&self) -> Value {
        let mut claim = Map::new();
        claim.insert(ALG.to_string(), Value::from(self.alg.as_str()));
        claim.insert(VALUE.to_string(), Value::from(self.value.as_str()));
        Value::Object(claim)
    }
}
