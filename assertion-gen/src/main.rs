use std::{path::PathBuf, time::Duration};

use clap::Parser;
use pdnd_client_assertion::config::SigningConfig;
use pdnd_client_assertion::services::assertion::{ClientAssertionGenerator, ComplementaryInfo};
use pdnd_client_assertion::services::assertion::consts::TOKEN_ENDPOINT_UAT;
use pdnd_client_assertion::services::oauth2::{OAuth2Service, PdndOAuth2Service, TokenClient};

/// Generate a PDND client assertion (RS256 JWT with tracking evidence digest).
///
/// Every flag falls back to the same environment variable the API server reads (.env
/// supported), so the same configuration drives both.
/// Outputs:
///   - client assertion
///   - token id (jti), iat / exp, digest of the tracking evidence
///   - access token response (with --request-token)
#[derive(Parser, Debug)]
#[command(name = "assertion-gen", version, about)]
struct Args {
    /// Token endpoint URL
    #[arg(long, env = "PDND_SERVER_URL", default_value = TOKEN_ENDPOINT_UAT)]
    server_url: String,

    /// Public key id registered on PDND (kid)
    #[arg(long, env = "PDND_KEY_ID")]
    key_id: String,

    #[arg(long, env = "PDND_ALGORITHM", default_value = "RS256")]
    algorithm: String,

    #[arg(long, env = "PDND_CLIENT_ID")]
    client_id: String,

    /// Defaults to the client id
    #[arg(long, env = "PDND_ISSUER")]
    issuer: Option<String>,

    /// Defaults to the client id
    #[arg(long, env = "PDND_SUBJECT")]
    subject: Option<String>,

    #[arg(long, env = "PDND_AUDIENCE")]
    audience: String,

    #[arg(long, env = "PDND_PURPOSE_ID")]
    purpose_id: String,

    /// Path to the RSA private key (PEM)
    #[arg(long, env = "PDND_KEY_PATH", value_name = "FILE", conflicts_with = "key_pem")]
    key_path: Option<PathBuf>,

    /// Inline RSA private key (PEM, "\n" escapes allowed)
    #[arg(long, env = "PDND_KEY_PEM", hide_env_values = true)]
    key_pem: Option<String>,

    /// Token lifetime in minutes
    #[arg(long, env = "PDND_DURATION_MINUTES", default_value_t = 5)]
    duration_minutes: i64,

    /// Complementary information for the tracking evidence (repeatable): key=value
    #[arg(long = "complementary", value_name = "KEY=VALUE", value_parser = parse_pair)]
    complementary: Vec<(String, String)>,

    /// Exchange the assertion for an access token and print the response
    #[arg(long, default_value_t = false)]
    request_token: bool,

    /// Deadline for the token request, in seconds
    #[arg(long, env = "PDND_REQUEST_TIMEOUT_SECONDS")]
    timeout_seconds: Option<u64>,

    /// Print only the client assertion (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

impl Args {
    fn signing_config(&self) -> SigningConfig {
        SigningConfig {
            server_url: self.server_url.clone(),
            key_id: self.key_id.clone(),
            algorithm: self.algorithm.clone(),
            token_type: "JWT".to_string(),
            client_id: self.client_id.clone(),
            issuer: self.issuer.clone().unwrap_or_else(|| self.client_id.clone()),
            subject: self.subject.clone().unwrap_or_else(|| self.client_id.clone()),
            audience: self.audience.clone(),
            purpose_id: self.purpose_id.clone(),
            key_path: self.key_path.clone(),
            key_pem: self.key_pem.as_ref().map(|s| s.replace("\\n", "\n")),
            duration_minutes: self.duration_minutes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.signing_config();
    let info: ComplementaryInfo = args.complementary.iter().cloned().collect();

    let mut client = TokenClient::new(config.server_url.clone())?;
    if let Some(secs) = args.timeout_seconds {
        client = client.with_timeout(Duration::from_secs(secs));
    }
    let service = PdndOAuth2Service::new(ClientAssertionGenerator::new(config), client);

    let assertion = service.generate_client_assertion_with(&info)?;

    if args.quiet {
        println!("{}", assertion.assertion);
    } else {
        println!("client_assertion: {}", assertion.assertion);
        println!("jti: {}", assertion.token_id);
        println!("iat: {}", assertion.issued_at.to_rfc3339());
        println!("exp: {}", assertion.expiration.to_rfc3339());
        println!("digest: {} {}", assertion.digest.alg, assertion.digest.value);
    }

    if args.request_token {
        let token = service.request_access_token(&assertion.assertion).await?;
        println!("{}", serde_json::to_string_pretty(&token)?);
    }

    Ok(())
}
