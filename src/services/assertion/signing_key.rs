use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::{ConfigError, KeySource, SigningConfig};
use crate::error::AssertionError;

/// RSA signing material for one generation call.
///
/// Built fresh from `SigningConfig` every time an assertion is generated and dropped
/// when the call returns, so a replaced key file is picked up on the next call.
pub struct SigningContext {
    encoding_key: EncodingKey,
    key_id: String,
    algorithm: Algorithm,
    token_type: String,
}

impl std::fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningContext")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .field("token_type", &self.token_type)
            .finish()
    }
}

impl SigningContext {
    /// Load the RSA private key (PKCS#1 or PKCS#8 PEM) from the configured source.
    pub fn load(config: &SigningConfig) -> Result<Self, AssertionError> {
        config.validate()?;

        let algorithm = match config.algorithm.as_str() {
            "RS256" => Algorithm::RS256,
            other => return Err(ConfigError::UnsupportedAlgorithm(other.to_string()).into()),
        };

        let pem = match config.key_source()? {
            KeySource::Path(path) => {
                debug!(path = %path.display(), "loading signing key from file");
                std::fs::read(path).map_err(|e| {
                    warn!(path = %path.display(), error = %e, "failed to read signing key file");
                    AssertionError::KeyRead {
                        path: path.to_path_buf(),
                        source: e,
                    }
                })?
            }
            KeySource::Pem(pem) => pem.as_bytes().to_vec(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(&pem).map_err(|e| {
            warn!(error = %e, "failed to parse signing key PEM (expected RSA private key)");
            AssertionError::InvalidKey(e)
        })?;

        Ok(Self {
            encoding_key,
            key_id: config.key_id.clone(),
            algorithm,
            token_type: config.token_type.clone(),
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Header shared by the tracking evidence and the client assertion: `alg`, `kid`, `typ`.
    pub fn header(&self) -> Header {
        let mut header = Header::new(self.algorithm);
        header.typ = Some(self.token_type.clone());
        header.kid = Some(self.key_id.clone());
        header
    }

    /// Sign `claims` into a compact JWS. `token` names the token in errors and logs.
    pub fn sign<T: Serialize>(
        &self,
        claims: &T,
        token: &'static str,
    ) -> Result<String, AssertionError> {
        jsonwebtoken::encode(&self.header(), claims, &self.encoding_key).map_err(|e| {
            error!(token, error = %e, "failed to sign token");
            AssertionError::Signing { token, source: e }
        })
    }
}
