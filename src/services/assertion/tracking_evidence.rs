use std::fmt;

use tracing::debug;

use crate::error::AssertionError;
use crate::services::assertion::claims::ClaimSet;
use crate::services::assertion::digest::Digest;
use crate::services::assertion::signing_key::SigningContext;

/// Signed tracking evidence (JWS compact serialization).
///
/// Never sent on its own: only its digest leaves the generation call, inside the assertion.
#[derive(Clone, PartialEq, Eq)]
pub struct TrackingEvidence(String);

impl TrackingEvidence {
    pub fn sign(claims: &ClaimSet, signing: &SigningContext) -> Result<Self, AssertionError> {
        let token = signing.sign(claims, "JWS")?;
        debug!(
            kid = signing.key_id(),
            claims = claims.len(),
            "tracking evidence signed"
        );
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn digest(&self) -> Digest {
        Digest::of_evidence(&self.0)
    }
}

impl fmt::Debug for TrackingEvidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TrackingEvidence")
            .field(&format_args!("<{} bytes>", self.0.len()))
            .finish()
    }
}
