/*
 * Responsibility
 * - Load settings from the environment (.env supported): listen address, PDND client settings
 * - Validate the signing configuration before anything is signed or sent
 */
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::services::assertion::consts::{
    ALGORITHM_RS256, TOKEN_ENDPOINT_PRODUCTION, TOKEN_ENDPOINT_UAT, TOKEN_TYPE_JWT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("no signature key configuration was provided (set PDND_KEY_PATH or PDND_KEY_PEM)")]
    MissingKeySource,
    #[error("both PDND_KEY_PATH and PDND_KEY_PEM are set; configure exactly one")]
    ConflictingKeySource,
    #[error("unsupported signing algorithm: {0} (only RS256 is supported)")]
    UnsupportedAlgorithm(String),
}

/// Where the RSA private key comes from.
#[derive(Debug, Clone, Copy)]
pub enum KeySource<'a> {
    Path(&'a Path),
    Pem(&'a str),
}

/// PDND client settings used to sign client assertions and request vouchers.
#[derive(Clone)]
pub struct SigningConfig {
    /// Authorization server token endpoint.
    pub server_url: String,
    /// Public key id registered on PDND (`kid`).
    pub key_id: String,
    /// Only RS256 is accepted.
    pub algorithm: String,
    /// Always "JWT".
    pub token_type: String,
    pub client_id: String,
    /// Usually the client id.
    pub issuer: String,
    /// Usually the client id.
    pub subject: String,
    pub audience: String,
    pub purpose_id: String,
    pub key_path: Option<PathBuf>,
    pub key_pem: Option<String>,
    /// Token lifetime; `exp = iat + duration_minutes`.
    pub duration_minutes: i64,
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // key_pem stays out of logs
        f.debug_struct("SigningConfig")
            .field("server_url", &self.server_url)
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .field("token_type", &self.token_type)
            .field("client_id", &self.client_id)
            .field("issuer", &self.issuer)
            .field("subject", &self.subject)
            .field("audience", &self.audience)
            .field("purpose_id", &self.purpose_id)
            .field("key_path", &self.key_path)
            .field("key_pem", &self.key_pem.as_ref().map(|_| "<redacted>"))
            .field("duration_minutes", &self.duration_minutes)
            .finish()
    }
}

impl SigningConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let server_url = match std::env::var("PDND_SERVER_URL") {
            Ok(url) => url,
            Err(_) => default_server_url(),
        };

        let key_id = required("PDND_KEY_ID")?;
        let algorithm =
            std::env::var("PDND_ALGORITHM").unwrap_or_else(|_| ALGORITHM_RS256.to_string());
        let token_type =
            std::env::var("PDND_TOKEN_TYPE").unwrap_or_else(|_| TOKEN_TYPE_JWT.to_string());
        let client_id = required("PDND_CLIENT_ID")?;
        let issuer = std::env::var("PDND_ISSUER").unwrap_or_else(|_| client_id.clone());
        let subject = std::env::var("PDND_SUBJECT").unwrap_or_else(|_| client_id.clone());
        let audience = required("PDND_AUDIENCE")?;
        let purpose_id = required("PDND_PURPOSE_ID")?;

        let key_path = std::env::var("PDND_KEY_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let key_pem = std::env::var("PDND_KEY_PEM")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.replace("\\n", "\n"));

        let duration_minutes = std::env::var("PDND_DURATION_MINUTES")
            .map_err(|_| ConfigError::Missing("PDND_DURATION_MINUTES"))?
            .parse::<i64>()
            .map_err(|_| ConfigError::Invalid("PDND_DURATION_MINUTES"))?;

        let config = Self {
            server_url,
            key_id,
            algorithm,
            token_type,
            client_id,
            issuer,
            subject,
            audience,
            purpose_id,
            key_path,
            key_pem,
            duration_minutes,
        };
        config.validate()?;

        Ok(config)
    }

    /// Check every invariant the pipeline relies on. Called before any key is loaded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required_fields = [
            (&self.server_url, "PDND_SERVER_URL"),
            (&self.key_id, "PDND_KEY_ID"),
            (&self.client_id, "PDND_CLIENT_ID"),
            (&self.issuer, "PDND_ISSUER"),
            (&self.subject, "PDND_SUBJECT"),
            (&self.audience, "PDND_AUDIENCE"),
            (&self.purpose_id, "PDND_PURPOSE_ID"),
        ];
        for (value, key) in required_fields {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(key));
            }
        }

        if self.algorithm != ALGORITHM_RS256 {
            return Err(ConfigError::UnsupportedAlgorithm(self.algorithm.clone()));
        }
        if self.token_type != TOKEN_TYPE_JWT {
            return Err(ConfigError::Invalid("PDND_TOKEN_TYPE"));
        }
        if self.duration_minutes <= 0 {
            return Err(ConfigError::Invalid("PDND_DURATION_MINUTES"));
        }

        self.key_source().map(|_| ())
    }

    /// Exactly one of `key_path` / `key_pem` must be set. Blank values count as unset.
    pub fn key_source(&self) -> Result<KeySource<'_>, ConfigError> {
        let key_path = self
            .key_path
            .as_ref()
            .filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty());
        let key_pem = self.key_pem.as_ref().filter(|pem| !pem.trim().is_empty());

        match (key_path, key_pem) {
            (Some(path), None) => Ok(KeySource::Path(path)),
            (None, Some(pem)) => Ok(KeySource::Pem(pem)),
            (None, None) => Err(ConfigError::MissingKeySource),
            (Some(_), Some(_)) => Err(ConfigError::ConflictingKeySource),
        }
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn default_server_url() -> String {
    match std::env::var("PDND_ENV")
        .unwrap_or_default()
        .to_ascii_lowercase()
        .as_str()
    {
        "production" | "prod" => TOKEN_ENDPOINT_PRODUCTION.to_string(),
        _ => TOKEN_ENDPOINT_UAT.to_string(),
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub signing: SigningConfig,
    // Optional deadline for the token exchange; None leaves it to the caller.
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let signing = SigningConfig::from_env()?;

        let request_timeout = match std::env::var("PDND_REQUEST_TIMEOUT_SECONDS") {
            Ok(v) => Some(Duration::from_secs(
                v.parse::<u64>()
                    .map_err(|_| ConfigError::Invalid("PDND_REQUEST_TIMEOUT_SECONDS"))?,
            )),
            Err(_) => None,
        };

        Ok(Self {
            addr,
            app_env,
            signing,
            request_timeout,
        })
    }
}
