// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::base64;
use super::errors::Error;
use openssl::x509::X509;

const CERT_COUNT: usize = 3;

const PEM_HEADER: &str = "-----BEGIN CERTIFICATE-----";
const PEM_FOOTER: &str = "-----END CERTIFICATE-----";

/// The certificate chain carried in the `x5c` header of a PKI token.  The
/// chain always has exactly three members.
#[derive(Clone)]
pub struct PkiCertificates {
    /// End-entity certificate whose key signs the token
    pub leaf: X509,
    /// Intermediate CA certificate
    pub intermediate: X509,
    /// Root CA certificate that anchors trust
    pub root: X509,
}

impl PkiCertificates {
    /// The three certificates with a display name, leaf first
    pub fn named(&self) -> [(&'static str, &X509); CERT_COUNT] {
        [
            ("Leaf", &self.leaf),
            ("Intermediate", &self.intermediate),
            ("Root", &self.root),
        ]
    }
}

impl TryFrom<&[String]> for PkiCertificates {
    type Error = Error;

    /// Decode an `x5c` array ordered leaf, intermediate, root.  Members may be
    /// bare base64 DER or PEM.
    fn try_from(x5c: &[String]) -> Result<Self, Error> {
        let [leaf, intermediate, root] = x5c else {
            return Err(Error::Validation(format!(
                "invalid x5c certificates in header: expecting {CERT_COUNT}, got {}",
                x5c.len()
            )));
        };

        Ok(Self {
            leaf: decode_der_certificate(leaf, "leaf")?,
            intermediate: decode_der_certificate(intermediate, "intermediate")?,
            root: decode_der_certificate(root, "root")?,
        })
    }
}

/// Strip any PEM armour and whitespace, then base64-decode and parse DER
pub fn decode_der_certificate(s: &str, name: &str) -> Result<X509, Error> {
    let cleaned: String = s
        .replace(PEM_HEADER, "")
        .replace(PEM_FOOTER, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let der = base64::decode_std(&cleaned)
        .map_err(|e| Error::CertificateParsing(format!("{name} certificate: {e:?}")))?;

    X509::from_der(&der)
        .map_err(|e| Error::CertificateParsing(format!("failed to decode {name} certificate: {e}")))
}
