use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SigningConfig;
use crate::error::AssertionError;
use crate::services::assertion::claims::{
    self, ComplementaryInfo, Nonce, TokenTimes, check_complementary_info,
};
use crate::services::assertion::digest::Digest;
use crate::services::assertion::signing_key::SigningContext;
use crate::services::assertion::tracking_evidence::TrackingEvidence;

/// Signed client assertion plus the metadata it was built from.
#[derive(Clone)]
pub struct ClientAssertion {
    pub assertion: String,
    pub token_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expiration: DateTime<Utc>,
    pub key_id: String,
    pub algorithm: String,
    pub token_type: String,
    pub issuer: String,
    pub subject: String,
    pub audience: String,
    pub purpose_id: String,
    pub digest: Digest,
}

impl std::fmt::Debug for ClientAssertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientAssertion")
            .field("token_id", &self.token_id)
            .field("issued_at", &self.issued_at)
            .field("expiration", &self.expiration)
            .field("key_id", &self.key_id)
            .field("purpose_id", &self.purpose_id)
            .field("digest", &self.digest)
            .finish_non_exhaustive()
    }
}

/// Builds PDND client assertions: tracking evidence -> digest -> signed assertion.
///
/// Holds only configuration; the key is loaded again on every call.
#[derive(Clone, Debug)]
pub struct ClientAssertionGenerator {
    config: SigningConfig,
}

impl ClientAssertionGenerator {
    pub fn new(config: SigningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    /// Generate an assertion with no complementary information.
    pub fn generate(&self) -> Result<ClientAssertion, AssertionError> {
        self.generate_with(&ComplementaryInfo::new())
    }

    /// Generate an assertion whose tracking evidence also carries `info`.
    pub fn generate_with(
        &self,
        info: &ComplementaryInfo,
    ) -> Result<ClientAssertion, AssertionError> {
        self.generate_at(Utc::now(), info)
    }

    /// Same as `generate_with`, with an explicit issue instant.
    pub fn generate_at(
        &self,
        now: DateTime<Utc>,
        info: &ComplementaryInfo,
    ) -> Result<ClientAssertion, AssertionError> {
        self.generate_parts(now, info).map(|(assertion, _)| assertion)
    }

    pub(crate) fn generate_parts(
        &self,
        now: DateTime<Utc>,
        info: &ComplementaryInfo,
    ) -> Result<(ClientAssertion, TrackingEvidence), AssertionError> {
        check_complementary_info(info)?;
        let signing = SigningContext::load(&self.config)?;

        // One snapshot for both tokens.
        let times = TokenTimes::starting_at(now, self.config.duration_minutes)?;

        let evidence_claims = claims::evidence_claims(
            &self.config,
            times,
            Uuid::new_v4(),
            Nonce::generate(),
            info,
        );
        let evidence = TrackingEvidence::sign(&evidence_claims, &signing)?;
        let digest = evidence.digest();

        let token_id = Uuid::new_v4();
        let assertion_claims = claims::assertion_claims(&self.config, times, token_id, &digest);
        let assertion = signing.sign(&assertion_claims, "JWT")?;

        debug!(
            token_id = %token_id,
            complementary = info.len(),
            digest = %digest.value,
            "client assertion signed"
        );
        info!(
            token_id = %token_id,
            kid = signing.key_id(),
            exp = %times.expiration(),
            "client assertion generated"
        );

        let assertion = ClientAssertion {
            assertion,
            token_id,
            issued_at: times.issued_at(),
            expiration: times.expiration(),
            key_id: signing.key_id().to_string(),
            algorithm: self.config.algorithm.clone(),
            token_type: signing.token_type().to_string(),
            issuer: self.config.issuer.clone(),
            subject: self.config.subject.clone(),
            audience: self.config.audience.clone(),
            purpose_id: self.config.purpose_id.clone(),
            digest,
        };

        Ok((assertion, evidence))
    }
}
