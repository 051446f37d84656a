// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::base64;
use super::errors::Error;
use serde::Deserialize;

/// The only JWS algorithm accepted on either validation path
pub const ALGO: &str = "RS256";

/// The JOSE header of a compact JWS, as found before any verification
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Header {
    pub alg: Option<String>,
    pub kid: Option<String>,
    pub typ: Option<String>,
    pub x5c: Option<Vec<String>>,
}

impl Header {
    /// Decode the (unverified) header of a compact-serialised JWS
    pub fn decode(token: &str) -> Result<Header, Error> {
        let mut parts = token.trim().split('.');

        let (Some(h), Some(_), Some(_), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::Validation(
                "token is not a compact JWS (expecting three dot-separated parts)".to_string(),
            ));
        };

        let raw = base64::decode_str(h)?;

        serde_json::from_slice(&raw)
            .map_err(|e| Error::Validation(format!("malformed token header: {e}")))
    }
}

/// How a token must be validated, as decided by its header
#[derive(Debug, PartialEq, Eq)]
pub enum Scheme {
    /// Signed by the leaf of an embedded leaf/intermediate/root chain
    Pki { x5c: Vec<String> },
    /// Signed by a key published in the issuer's JWKS
    Oidc { kid: Option<String> },
}

impl Scheme {
    /// Pick the validation scheme for a token.  Only the header is looked at,
    /// and any algorithm other than [`ALGO`] is refused before anything else.
    pub fn detect(token: &str) -> Result<Scheme, Error> {
        let header = Header::decode(token)?;

        tracing::info!(alg = ?header.alg, kid = ?header.kid, "token");

        match header.alg.as_deref() {
            Some(ALGO) => {}
            other => {
                return Err(Error::UnsupportedAlgorithm {
                    found: other.unwrap_or("none").to_string(),
                    expected: ALGO.to_string(),
                })
            }
        }

        match header.x5c {
            Some(x5c) if !x5c.is_empty() => {
                tracing::info!(alg = ALGO, "PKI_token");
                Ok(Scheme::Pki { x5c })
            }
            _ => {
                tracing::info!(alg = ALGO, "OIDC_token");
                Ok(Scheme::Oidc { kid: header.kid })
            }
        }
    }
}
