// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::base64::Bytes;
use super::claims::{verify_rs256, Claims};
use super::errors::Error;
use super::IWellKnownFetcher;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::DecodingKey;
use openssl::bn::BigNum;
use openssl::rsa::Rsa;
use serde::Deserialize;

/// The subset of the OpenID provider metadata that is needed here
#[derive(Debug, Deserialize)]
struct Discovery {
    jwks_uri: String,
}

#[derive(Debug, Deserialize)]
struct JsonWebKeySet {
    keys: Vec<serde_json::Value>,
}

/// An RSA public key from the issuer's JWKS
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct KeySetEntry {
    #[serde(rename = "kid")]
    pub key_id: String,
    /// big-endian unsigned modulus
    #[serde(rename = "n")]
    pub modulus: Bytes,
    /// big-endian unsigned public exponent
    #[serde(rename = "e")]
    pub exponent: Bytes,
}

impl KeySetEntry {
    /// Rebuild the RSA public key as a JWS verification key
    pub fn decoding_key(&self) -> Result<DecodingKey, Error> {
        let rsa_err = |e: openssl::error::ErrorStack| {
            Error::Validation(format!("rebuilding RSA key {}: {e}", self.key_id))
        };

        let n = BigNum::from_slice(self.modulus.as_slice()).map_err(rsa_err)?;
        let e = BigNum::from_slice(self.exponent.as_slice()).map_err(rsa_err)?;

        let der = Rsa::from_public_components(n, e)
            .and_then(|k| k.public_key_to_der_pkcs1())
            .map_err(rsa_err)?;

        Ok(DecodingKey::from_rsa_der(&der))
    }
}

/// Validates tokens signed by a key published in the issuer's JWKS
pub struct OidcValidator<'a> {
    pub fetcher: &'a dyn IWellKnownFetcher,
    /// `{issuer}{discovery path}`
    pub discovery_url: String,
}

impl OidcValidator<'_> {
    pub fn validate(&self, token: &str, kid: Option<&str>) -> Result<Claims, Error> {
        let kid = kid.ok_or_else(|| {
            Error::Validation("unable to find key id (kid) in token header".to_string())
        })?;

        let discovery: Discovery = self.fetch_json(&self.discovery_url)?;
        let jwks: JsonWebKeySet = self.fetch_json(&discovery.jwks_uri)?;

        let entry = find_key(&jwks, kid)?;

        tracing::info!(kid = %entry.key_id, "kid_match");

        let key = entry.decoding_key()?;

        match verify_rs256(token, &key) {
            Ok(claims) => {
                tracing::info!(url = %self.discovery_url, kid, "signature_match");
                Ok(claims)
            }
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                tracing::warn!(error = %e, "token_expired");
                Err(Error::SignatureValidation("token has expired".to_string()))
            }
            Err(e) => {
                tracing::warn!(error = %e, "invalid_token");
                Err(Error::Validation(format!("token is invalid: {e}")))
            }
        }
    }

    fn fetch_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, Error> {
        let body = self.fetcher.fetch(url)?;

        serde_json::from_slice(&body)
            .map_err(|e| Error::Validation(format!("malformed document at {url}: {e}")))
    }
}

/// Find the JWKS entry whose `kid` equals `kid`.  Entries without a string
/// `kid` are skipped.
fn find_key(jwks: &JsonWebKeySet, kid: &str) -> Result<KeySetEntry, Error> {
    let key = jwks
        .keys
        .iter()
        .find(|k| k.get("kid").and_then(|v| v.as_str()) == Some(kid))
        .ok_or_else(|| Error::Validation(format!("key id not found: {kid}")))?;

    serde_json::from_value(key.clone())
        .map_err(|e| Error::Validation(format!("malformed JWKS entry {kid}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::test_support::*;
    use crate::validation::MemoFetcher;
    use serde_json::json;

    const DISCOVERY_URL: &str = "https://issuer.test/.well-known/openid-configuration";
    const JWKS_URL: &str = "https://issuer.test/jwks";

    fn fetcher_with(jwks: serde_json::Value) -> MemoFetcher {
        MemoFetcher::new()
            .with(
                DISCOVERY_URL,
                json!({"issuer": "https://issuer.test", "jwks_uri": JWKS_URL}).to_string(),
            )
            .with(JWKS_URL, jwks.to_string())
    }

    fn validate(f: &MemoFetcher, token: &str, kid: Option<&str>) -> Result<Claims, Error> {
        OidcValidator {
            fetcher: f,
            discovery_url: DISCOVERY_URL.to_string(),
        }
        .validate(token, kid)
    }

    #[test]
    fn good_token() {
        let key = TestKey::generate();
        let other = TestKey::generate();
        let f = fetcher_with(json!({"keys": [other.jwk("k0"), key.jwk("k1")]}));

        let payload = sample_claims(3600);
        let token = key.sign_oidc("k1", &payload);

        let claims = validate(&f, &token, Some("k1")).unwrap();

        assert_eq!(serde_json::Value::Object(claims), payload);
    }

    #[test]
    fn padded_components_accepted() {
        let key = TestKey::generate();
        let mut jwk = key.jwk("k1");
        // "AQAB" has no padding to add, so pad the modulus instead
        let n = format!("{}==", jwk["n"].as_str().unwrap());
        jwk["n"] = json!(n);
        let f = fetcher_with(json!({"keys": [jwk]}));

        let token = key.sign_oidc("k1", &sample_claims(3600));

        assert!(validate(&f, &token, Some("k1")).is_ok());
    }

    #[test]
    fn unknown_kid() {
        let key = TestKey::generate();
        let f = fetcher_with(json!({"keys": [key.jwk("k1"), {"kty": "RSA"}]}));

        let token = key.sign_oidc("k2", &sample_claims(3600));

        match validate(&f, &token, Some("k2")) {
            Err(Error::Validation(m)) => assert!(m.contains("key id not found")),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn missing_kid() {
        let f = MemoFetcher::new();

        assert!(matches!(
            validate(&f, "a.b.c", None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn expired_token() {
        let key = TestKey::generate();
        let f = fetcher_with(json!({"keys": [key.jwk("k1")]}));

        let token = key.sign_oidc("k1", &sample_claims(-3600));

        assert!(matches!(
            validate(&f, &token, Some("k1")),
            Err(Error::SignatureValidation(_))
        ));
    }

    #[test]
    fn wrong_key_for_kid() {
        let signer = TestKey::generate();
        let published = TestKey::generate();
        let f = fetcher_with(json!({"keys": [published.jwk("k1")]}));

        let token = signer.sign_oidc("k1", &sample_claims(3600));

        assert!(matches!(
            validate(&f, &token, Some("k1")),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn discovery_unavailable() {
        let key = TestKey::generate();
        let f = MemoFetcher::new().with(JWKS_URL, json!({"keys": [key.jwk("k1")]}).to_string());

        let token = key.sign_oidc("k1", &sample_claims(3600));

        assert!(matches!(
            validate(&f, &token, Some("k1")),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn jwks_unavailable() {
        let key = TestKey::generate();
        let f = MemoFetcher::new().with(
            DISCOVERY_URL,
            json!({"jwks_uri": "https://issuer.test/gone"}).to_string(),
        );

        let token = key.sign_oidc("k1", &sample_claims(3600));

        assert!(matches!(
            validate(&f, &token, Some("k1")),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn discovery_without_jwks_uri() {
        let f = MemoFetcher::new().with(DISCOVERY_URL, "{}");

        assert!(matches!(
            validate(&f, "a.b.c", Some("k1")),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn malformed_matching_entry() {
        let f = fetcher_with(json!({"keys": [{"kid": "k1", "n": "***", "e": "AQAB"}]}));

        match validate(&f, "a.b.c", Some("k1")) {
            Err(Error::Validation(m)) => assert!(m.contains("malformed JWKS entry")),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
