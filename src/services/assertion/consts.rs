//! Read-only names and values shared by the assertion pipeline and the token exchange.

/// PDND token endpoint (UAT / collaudo).
pub const TOKEN_ENDPOINT_UAT: &str = "https://auth.uat.interop.pagopa.it/token.oauth2";
/// PDND token endpoint (production).
pub const TOKEN_ENDPOINT_PRODUCTION: &str = "https://auth.interop.pagopa.it/token.oauth2";

pub const CLIENT_ASSERTION_TYPE_JWT_BEARER: &str =
    "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

pub const ALGORITHM_RS256: &str = "RS256";
pub const TOKEN_TYPE_JWT: &str = "JWT";

/// Registered JWT claim names.
pub mod claims {
    pub const ISS: &str = "iss";
    pub const SUB: &str = "sub";
    pub const AUD: &str = "aud";
    pub const JTI: &str = "jti";
    pub const IAT: &str = "iat";
    pub const EXP: &str = "exp";

    // PDND domain claims
    pub const PURPOSE_ID: &str = "purposeId";
    pub const DNONCE: &str = "dnonce";
    pub const DIGEST: &str = "digest";

    // Well-known complementary information keys (tracking evidence)
    pub const USER_ID: &str = "userID";
    pub const USER_LOCATION: &str = "userLocation";
}

/// Field names of the `digest` claim object.
pub mod digest {
    pub const ALG: &str = "alg";
    pub const VALUE: &str = "value";
    pub const SHA_256: &str = "SHA-256";
}

/// Form field names of the client-credentials token request.
pub mod params {
    pub const CLIENT_ID: &str = "client_id";
    pub const CLIENT_ASSERTION: &str = "client_assertion";
    pub const CLIENT_ASSERTION_TYPE: &str = "client_assertion_type";
    pub const GRANT_TYPE: &str = "grant_type";
}

/// Claim names the caller must not override through complementary information.
pub const RESERVED_EVIDENCE_CLAIMS: [&str; 7] = [
    claims::AUD,
    claims::ISS,
    claims::PURPOSE_ID,
    claims::IAT,
    claims::EXP,
    claims::JTI,
    claims::DNONCE,
];
