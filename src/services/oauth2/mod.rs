pub mod client;
pub mod service;
pub mod token_request;
pub mod token_response;

pub use client::TokenClient;
pub use service::{OAuth2Service, PdndOAuth2Service};
pub use token_request::TokenRequest;
pub use token_response::TokenResponse;
