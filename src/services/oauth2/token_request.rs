use std::fmt;

use url::form_urlencoded;

use crate::services::assertion::consts::{
    CLIENT_ASSERTION_TYPE_JWT_BEARER, GRANT_TYPE_CLIENT_CREDENTIALS, params,
};

/// Client-credentials token request (`application/x-www-form-urlencoded`).
///
/// Field order: client_id, client_assertion, client_assertion_type, grant_type.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenRequest {
    fields: [(&'static str, String); 4],
}

impl TokenRequest {
    pub fn new(client_id: impl Into<String>, client_assertion: impl Into<String>) -> Self {
        Self {
            fields: [
                (params::CLIENT_ID, client_id.into()),
                (params::CLIENT_ASSERTION, client_assertion.into()),
                (
                    params::CLIENT_ASSERTION_TYPE,
                    CLIENT_ASSERTION_TYPE_JWT_BEARER.to_string(),
                ),
                (
                    params::GRANT_TYPE,
                    GRANT_TYPE_CLIENT_CREDENTIALS.to_string(),
                ),
            ],
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn client_id(&self) -> &str {
        &self.fields[0].1
    }

    pub fn client_assertion(&self) -> &str {
        &self.fields[1].1
    }

    /// URL-encoded request body.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields())
            .finish()
    }

    /// Decode a URL-encoded body back into ordered pairs.
    pub fn decode(body: &str) -> Vec<(String, String)> {
        form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect()
    }
}

impl fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequest")
            .field("client_id", &self.client_id())
            .field(
                "client_assertion",
                &format_args!("<{} bytes>", self.client_assertion().len()),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_ordered() {
        let request = TokenRequest::new("client-1", "a.b.c");
        let names: Vec<&str> = request.fields().map(|(k, _)| k).collect();
        assert_eq!(
            names,
            vec![
                "client_id",
                "client_assertion",
                "client_assertion_type",
                "grant_type"
            ]
        );
    }

    #[test]
    fn encode_decode_round_trip() {
        let request = TokenRequest::new("client id/ä", "eyJ.eyJ+x=.sig_-");
        let decoded = TokenRequest::decode(&request.encode());

        let original: Vec<(String, String)> = request
            .fields()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(decoded, original);
    }

    #[test]
    fn encodes_urn_and_grant_type() {
        let body = TokenRequest::new("c", "x").encode();
        assert_eq!(
            body,
            "client_id=c&client_assertion=x\
             &client_assertion_type=urn%3Aietf%3Aparams%3Aoauth%3Aclient-assertion-type%3Ajwt-bearer\
             &grant_type=client_credentials"
        );
    }

    #[test]
    fn debug_hides_assertion() {
        let request = TokenRequest::new("c", "secret.jwt.value");
        let debug = format!("{request:?}");
        assert!(!debug.contains("secret"));
    }
}
