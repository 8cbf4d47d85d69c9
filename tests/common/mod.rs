#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use pdnd_client_assertion::config::SigningConfig;
use serde_json::Value;

pub const PRIVATE_KEY: &str = include_str!("../fixtures/client_private.pem");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/client_public.pem");

pub fn signing_config(server_url: &str) -> SigningConfig {
    SigningConfig {
        server_url: server_url.to_string(),
        key_id: "test-kid".to_string(),
        algorithm: "RS256".to_string(),
        token_type: "JWT".to_string(),
        client_id: "9b361d49-33f4-4f1e-a88b-4e12661f2309".to_string(),
        issuer: "9b361d49-33f4-4f1e-a88b-4e12661f2309".to_string(),
        subject: "9b361d49-33f4-4f1e-a88b-4e12661f2309".to_string(),
        audience: "auth.uat.interop.pagopa.it/client-assertion".to_string(),
        purpose_id: "1b361d49-33f4-4f1e-a88b-4e12661f2300".to_string(),
        key_path: None,
        key_pem: Some(PRIVATE_KEY.to_string()),
        duration_minutes: 5,
    }
}

/// Decode the JSON segment at `index` (0 = header, 1 = payload) without verifying.
pub fn segment(token: &str, index: usize) -> Value {
    let part = token.split('.').nth(index).expect("segment");
    let bytes = URL_SAFE_NO_PAD.decode(part).expect("base64url");
    serde_json::from_slice(&bytes).expect("json")
}
