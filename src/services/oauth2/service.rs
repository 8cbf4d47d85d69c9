use async_trait::async_trait;

use crate::config::SigningConfig;
use crate::error::AssertionError;
use crate::services::assertion::{ClientAssertion, ClientAssertionGenerator, ComplementaryInfo};
use crate::services::oauth2::client::TokenClient;
use crate::services::oauth2::token_request::TokenRequest;
use crate::services::oauth2::token_response::TokenResponse;

/// PDND OAuth2 operations: client assertion generation and voucher request.
///
/// `PdndOAuth2Service` is the production implementation; handlers depend on the trait.
#[async_trait]
pub trait OAuth2Service: Send + Sync {
    fn generate_client_assertion(&self) -> Result<ClientAssertion, AssertionError> {
        self.generate_client_assertion_with(&ComplementaryInfo::new())
    }

    fn generate_client_assertion_with(
        &self,
        info: &ComplementaryInfo,
    ) -> Result<ClientAssertion, AssertionError>;

    /// Build the token request body for `client_assertion` (no I/O).
    fn token_request(&self, client_assertion: &str) -> TokenRequest;

    async fn send_token_request(
        &self,
        request: &TokenRequest,
    ) -> Result<TokenResponse, AssertionError>;

    async fn request_access_token(
        &self,
        client_assertion: &str,
    ) -> Result<TokenResponse, AssertionError> {
        let request = self.token_request(client_assertion);
        self.send_token_request(&request).await
    }

    /// Full pipeline: sign a fresh assertion and exchange it.
    async fn obtain_access_token(
        &self,
        info: &ComplementaryInfo,
    ) -> Result<TokenResponse, AssertionError> {
        let assertion = self.generate_client_assertion_with(info)?;
        self.request_access_token(&assertion.assertion).await
    }
}

#[derive(Clone, Debug)]
pub struct PdndOAuth2Service {
    generator: ClientAssertionGenerator,
    client: TokenClient,
}

impl PdndOAuth2Service {
    pub fn new(generator: ClientAssertionGenerator, client: TokenClient) -> Self {
        Self { generator, client }
    }

    /// Build the service from configuration, posting to `config.server_url`.
    pub fn from_config(config: SigningConfig) -> Result<Self, AssertionError> {
        let client = TokenClient::new(config.server_url.clone())?;
        Ok(Self::new(ClientAssertionGenerator::new(config), client))
    }
}

#[async_trait]
impl OAuth2Service for PdndOAuth2Service {
    fn generate_client_assertion_with(
        &self,
        info: &ComplementaryInfo,
    ) -> Result<ClientAssertion, AssertionError> {
        self.generator.generate_with(info)
    }

    fn token_request(&self, client_assertion: &str) -> TokenRequest {
        TokenRequest::new(self.generator.config().client_id.as_str(), client_assertion)
    }

    async fn send_token_request(
        &self,
        request: &TokenRequest,
    ) -> Result<TokenResponse, AssertionError> {
        self.client.request_access_token(request).await
    }
}
