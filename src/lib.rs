//! PDND client assertion generator.
//!
//! Signs OAuth2 client assertions (RS256 JWT) that embed the SHA-256 digest of a separately
//! signed tracking evidence (JWS), and exchanges them for access tokens at the PDND
//! authorization server.
//!
//! ```no_run
//! use pdnd_client_assertion::config::SigningConfig;
//! use pdnd_client_assertion::services::oauth2::{OAuth2Service, PdndOAuth2Service};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let service = PdndOAuth2Service::from_config(SigningConfig::from_env()?)?;
//! let assertion = service.generate_client_assertion()?;
//! let token = service.request_access_token(&assertion.assertion).await?;
//! println!("{} expires in {}s", token.token_type, token.expires_in);
//! # Ok(())
//! # }
//! ```
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
