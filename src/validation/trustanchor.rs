// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use openssl::hash::MessageDigest;
use openssl::x509::X509Ref;

/// SHA-1 fingerprint of the Confidential Space root certificate
pub const CONFIDENTIAL_SPACE_ROOT_FINGERPRINT: &str =
    "B9:51:20:74:2C:24:E3:AA:34:04:2E:1C:3B:A3:AA:D2:8B:21:23:21";

/// The pinned fingerprint of the one root certificate that is trusted.
/// Defaults to [`CONFIDENTIAL_SPACE_ROOT_FINGERPRINT`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrustAnchor {
    fingerprint: String,
}

impl Default for TrustAnchor {
    fn default() -> Self {
        Self {
            fingerprint: CONFIDENTIAL_SPACE_ROOT_FINGERPRINT.to_string(),
        }
    }
}

impl TrustAnchor {
    /// Pin a different root.  `fingerprint` is a colon-separated SHA-1 hex
    /// string; case is not significant.
    pub fn new(fingerprint: &str) -> Self {
        Self {
            fingerprint: fingerprint.trim().to_ascii_uppercase(),
        }
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Fail unless `cert` is the pinned root
    pub fn check(&self, cert: &X509Ref) -> Result<(), Error> {
        let calculated = fingerprint(cert)?;

        if calculated != self.fingerprint {
            return Err(Error::Validation(format!(
                "root certificate fingerprint does not match expected fingerprint. Expected: {}, Received: {}",
                self.fingerprint, calculated
            )));
        }

        Ok(())
    }
}

/// SHA-1 fingerprint of `cert`, as colon-separated uppercase hex
pub fn fingerprint(cert: &X509Ref) -> Result<String, Error> {
    let d = cert
        .digest(MessageDigest::sha1())
        .map_err(|e| Error::Validation(format!("computing certificate fingerprint: {e}")))?;

    Ok(format_fingerprint(&d))
}

pub(crate) fn format_fingerprint(digest: &[u8]) -> String {
    let hex = hex::encode_upper(digest);
    let mut out = String::with_capacity(hex.len() + hex.len() / 2);

    for (i, c) in hex.chars().enumerate() {
        if i > 0 && i % 2 == 0 {
            out.push(':');
        }
        out.push(c);
    }

    out
}
