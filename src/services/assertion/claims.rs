//! Claim sets of the tracking evidence and of the client assertion.
//!
//! Both sets are built from the same `TokenTimes` snapshot: the two tokens describe one
//! logical transaction and must carry identical `iat` / `exp`.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::{ConfigError, SigningConfig};
use crate::error::AssertionError;
use crate::services::assertion::consts::{RESERVED_EVIDENCE_CLAIMS, claims};
use crate::services::assertion::digest::Digest;

/// Caller-supplied key/value pairs merged into the tracking evidence payload.
///
/// Keeps insertion order; re-inserting a key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct ComplementaryInfo(Map<String, Value>);

impl ComplementaryInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), Value::String(value.into()));
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|(name, value)| value.as_str().map(|v| (name.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl TryFrom<Map<String, Value>> for ComplementaryInfo {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        match map.iter().find(|(_, value)| !value.is_string()) {
            Some((name, _)) => Err(format!("complementary value of '{name}' must be a string")),
            None => Ok(Self(map)),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ComplementaryInfo {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut info = Self::new();
        for (name, value) in iter {
            info.insert(name, value);
        }
        info
    }
}

/// `iat` / `exp` pair, truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTimes {
    issued_at: DateTime<Utc>,
    expiration: DateTime<Utc>,
}

impl TokenTimes {
    pub fn starting_at(now: DateTime<Utc>, duration_minutes: i64) -> Result<Self, AssertionError> {
        let invalid = || ConfigError::Invalid("PDND_DURATION_MINUTES");

        let issued_at = DateTime::from_timestamp(now.timestamp(), 0).ok_or_else(invalid)?;
        let expiration = TimeDelta::try_minutes(duration_minutes)
            .and_then(|d| issued_at.checked_add_signed(d))
            .ok_or_else(invalid)?;

        Ok(Self {
            issued_at,
            expiration,
        })
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    pub fn iat(&self) -> i64 {
        self.issued_at.timestamp()
    }

    pub fn exp(&self) -> i64 {
        self.expiration.timestamp()
    }
}

/// 13-digit tracking nonce (`dnonce`).
///
/// Drawn from a general-purpose RNG: it only adds entropy to the evidence, it is not a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Nonce(u64);

impl Nonce {
    pub const MIN: u64 = 1_000_000_000_000;
    pub const MAX: u64 = 9_999_999_999_999;

    pub fn generate() -> Self {
        Self(rand::rng().random_range(Self::MIN..=Self::MAX))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered claim name -> value mapping, serialized as the JWT payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a claim, keeping its original position when replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Fail on complementary keys that would override a base evidence claim.
pub fn check_complementary_info(info: &ComplementaryInfo) -> Result<(), AssertionError> {
    match info.keys().find(|k| RESERVED_EVIDENCE_CLAIMS.contains(k)) {
        Some(name) => Err(AssertionError::ReservedClaim(name.to_string())),
        None => Ok(()),
    }
}

/// Evidence claims: aud, iss, purposeId, iat, exp, jti, dnonce, then complementary pairs.
///
/// `info` must already have passed `check_complementary_info`.
pub fn evidence_claims(
    config: &SigningConfig,
    times: TokenTimes,
    jti: Uuid,
    nonce: Nonce,
    info: &ComplementaryInfo,
) -> ClaimSet {
    let mut set = ClaimSet::new();
    set.insert(claims::AUD, config.audience.as_str());
    set.insert(claims::ISS, config.issuer.as_str());
    set.insert(claims::PURPOSE_ID, config.purpose_id.as_str());
    set.insert(claims::IAT, times.iat());
    set.insert(claims::EXP, times.exp());
    set.insert(claims::JTI, jti.to_string());
    set.insert(claims::DNONCE, nonce.value());

    for (name, value) in info.iter() {
        set.insert(name, value);
    }

    set
}

/// Assertion claims: iss, sub, aud, purposeId, jti, iat, exp, digest.
pub fn assertion_claims(
    config: &SigningConfig,
    times: TokenTimes,
    jti: Uuid,
    digest: &Digest,
) -> ClaimSet {
    let mut set = ClaimSet::new();
    set.insert(claims::ISS, config.issuer.as_str());
    set.insert(claims::SUB, config.subject.as_str());
    set.insert(claims::AUD, config.audience.as_str());
    set.insert(claims::PURPOSE_ID, config.purpose_id.as_str());
    set.insert(claims::JTI, jti.to_string());
    set.insert(claims::IAT, times.iat());
    set.insert(claims::EXP, times.exp());
    set.insert(claims::DIGEST, digest.to_claim());
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_config;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap() + TimeDelta::milliseconds(750)
    }

    #[test]
    fn times_are_truncated_to_seconds() {
        let times = TokenTimes::starting_at(fixed_now(), 5).unwrap();
        assert_eq!(times.issued_at().timestamp_subsec_nanos(), 0);
        assert_eq!(times.iat(), fixed_now().timestamp());
        assert_eq!(times.exp() - times.iat(), 5 * 60);
    }

    #[test]
    fn absurd_duration_is_rejected() {
        let err = TokenTimes::starting_at(fixed_now(), i64::MAX).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn nonce_has_thirteen_digits() {
        for _ in 0..1000 {
            let nonce = Nonce::generate();
            assert!((Nonce::MIN..=Nonce::MAX).contains(&nonce.value()));
            assert_eq!(nonce.to_string().len(), 13);
        }
    }

    #[test]
    fn evidence_claims_are_ordered_and_merged() {
        let config = sample_config();
        let times = TokenTimes::starting_at(fixed_now(), 10).unwrap();
        let mut info = ComplementaryInfo::new();
        info.insert(claims::USER_LOCATION, "office-7");
        info.insert(claims::USER_ID, "user-42");

        let set = evidence_claims(&config, times, Uuid::new_v4(), Nonce(1234567890123), &info);

        let names: Vec<&str> = set.names().collect();
        assert_eq!(
            names,
            vec![
                "aud",
                "iss",
                "purposeId",
                "iat",
                "exp",
                "jti",
                "dnonce",
                "userLocation",
                "userID"
            ]
        );
        assert_eq!(set.get("dnonce"), Some(&Value::from(1234567890123u64)));
        assert_eq!(set.get("userID"), Some(&Value::from("user-42")));
    }

    #[test]
    fn reserved_complementary_key_is_rejected() {
        let mut info = ComplementaryInfo::new();
        info.insert(claims::USER_ID, "user-42");
        info.insert("purposeId", "other");

        let err = check_complementary_info(&info).unwrap_err();
        assert!(matches!(err, AssertionError::ReservedClaim(name) if name == "purposeId"));
    }

    #[test]
    fn complementary_info_keeps_body_order() {
        let info: ComplementaryInfo =
            serde_json::from_str(r#"{"zeta":"1","alpha":"2","mid":"3"}"#).unwrap();
        let pairs: Vec<(&str, &str)> = info.iter().collect();
        assert_eq!(pairs, vec![("zeta", "1"), ("alpha", "2"), ("mid", "3")]);
    }

    #[test]
    fn complementary_info_rejects_non_string_values() {
        let err = serde_json::from_str::<ComplementaryInfo>(r#"{"userID":42}"#).unwrap_err();
        assert!(err.to_string().contains("userID"));
    }

    #[test]
    fn assertion_claims_carry_digest_object() {
        let config = sample_config();
        let times = TokenTimes::starting_at(fixed_now(), 10).unwrap();
        let digest = Digest::of_evidence("header.payload.signature");

        let set = assertion_claims(&config, times, Uuid::new_v4(), &digest);
        let names: Vec<&str> = set.names().collect();
        assert_eq!(
            names,
            vec!["iss", "sub", "aud", "purposeId", "jti", "iat", "exp", "digest"]
        );
        assert_eq!(set.get("digest").unwrap()["alg"], "SHA-256");
    }
}
