// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::chain::PkiCertificates;
use super::claims::{verify_rs256, Claims};
use super::errors::Error;
use super::{IWellKnownFetcher, TrustAnchor};
use jsonwebtoken::DecodingKey;
use openssl::asn1::{Asn1Time, Asn1TimeRef};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::Id;
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::verify::X509VerifyParam;
use openssl::x509::{X509Ref, X509StoreContext, X509};
use std::cmp::Ordering;

/// Validates tokens signed by the leaf of the x5c chain carried in their
/// header.
///
/// The root certificate published by the issuer must carry the pinned
/// fingerprint, and the root embedded in the token must be that same
/// certificate.
pub struct PkiValidator<'a> {
    pub fetcher: &'a dyn IWellKnownFetcher,
    /// `{issuer}{root certificate path}`
    pub root_url: String,
    pub anchor: &'a TrustAnchor,
}

impl PkiValidator<'_> {
    pub fn validate(&self, token: &str, x5c: &[String]) -> Result<Claims, Error> {
        let now = Asn1Time::days_from_now(0)
            .map_err(|e| Error::Validation(format!("reading current time: {e}")))?;

        self.validate_at(token, x5c, &now)
    }

    /// Same as [`PkiValidator::validate`], checking certificate validity
    /// windows against `now`
    pub fn validate_at(
        &self,
        token: &str,
        x5c: &[String],
        now: &Asn1TimeRef,
    ) -> Result<Claims, Error> {
        let root = self.fetch_root()?;
        self.anchor.check(&root)?;

        let certs = PkiCertificates::try_from(x5c)?;

        validate_leaf_certificate(&certs.leaf)?;
        compare_root_certificates(&certs.root, &root)?;
        check_certificate_validity(&certs, now)?;
        verify_certificate_chain(&certs, now)?;

        let key = leaf_decoding_key(&certs.leaf)?;

        let claims = verify_rs256(token, &key).map_err(|e| {
            tracing::warn!(error = %e, "invalid_token");
            Error::Validation(format!("token signature validation failed: {e}"))
        })?;

        tracing::info!(root = %self.root_url, "signature_match");

        Ok(claims)
    }

    fn fetch_root(&self) -> Result<X509, Error> {
        let pem = self.fetcher.fetch(&self.root_url)?;

        X509::from_pem(&pem).map_err(|e| {
            Error::Validation(format!(
                "root certificate at {} is not a PEM certificate: {e}",
                self.root_url
            ))
        })
    }
}

/// The leaf must be signed with SHA-256 and hold an RSA key
fn validate_leaf_certificate(leaf: &X509Ref) -> Result<(), Error> {
    let sig_alg = leaf.signature_algorithm().object().nid();

    let algs = sig_alg.signature_algorithms().ok_or_else(|| {
        Error::SignatureValidation("no signature hash algorithm found".to_string())
    })?;

    if algs.digest != Nid::SHA256 {
        return Err(Error::SignatureValidation(format!(
            "invalid signature algorithm: {}",
            algs.digest.short_name().unwrap_or("unknown")
        )));
    }

    let pkey = leaf.public_key().map_err(|e| {
        Error::SignatureValidation(format!("reading leaf certificate public key: {e}"))
    })?;

    if pkey.id() != Id::RSA {
        return Err(Error::SignatureValidation(
            "leaf certificate must use RSA public key".to_string(),
        ));
    }

    Ok(())
}

/// The root in the token must be byte-for-byte the one fetched from the
/// issuer, compared by SHA-256 digest
fn compare_root_certificates(token_root: &X509Ref, root: &X509Ref) -> Result<(), Error> {
    let digest = |c: &X509Ref| {
        c.digest(MessageDigest::sha256())
            .map_err(|e| Error::Validation(format!("hashing root certificate: {e}")))
    };

    if *digest(token_root)? != *digest(root)? {
        return Err(Error::Validation(
            "root certificate fingerprint mismatch: token root differs from issuer root"
                .to_string(),
        ));
    }

    Ok(())
}

fn check_certificate_validity(certs: &PkiCertificates, now: &Asn1TimeRef) -> Result<(), Error> {
    for (name, cert) in certs.named() {
        if !is_certificate_valid(cert, now)? {
            return Err(Error::InvalidCertificateChain(format!(
                "{name} certificate is not valid (not before {}, not after {})",
                cert.not_before(),
                cert.not_after()
            )));
        }
    }

    Ok(())
}

fn is_certificate_valid(cert: &X509Ref, now: &Asn1TimeRef) -> Result<bool, Error> {
    let cmp = |t: &Asn1TimeRef| {
        now.compare(t).map_err(|e| {
            Error::InvalidCertificateChain(format!("comparing certificate validity time: {e}"))
        })
    };

    let after_start = cmp(cert.not_before())? != Ordering::Less;
    let before_end = cmp(cert.not_after())? != Ordering::Greater;

    Ok(after_start && before_end)
}

/// Seconds since the Unix epoch at `t`
fn unix_time(t: &Asn1TimeRef) -> Result<i64, openssl::error::ErrorStack> {
    let epoch = Asn1Time::from_unix(0)?;
    let d = epoch.diff(t)?;

    Ok(i64::from(d.days) * 86_400 + i64::from(d.secs))
}

/// Check each link (leaf by intermediate, intermediate by root), then let
/// OpenSSL build the path at `now` with the root as the only trusted
/// certificate
fn verify_certificate_chain(certs: &PkiCertificates, now: &Asn1TimeRef) -> Result<(), Error> {
    let chain_err =
        |e: openssl::error::ErrorStack| Error::InvalidCertificateChain(format!("{e}"));

    for (subject, issuer, name) in [
        (&certs.leaf, &certs.intermediate, "leaf"),
        (&certs.intermediate, &certs.root, "intermediate"),
    ] {
        let issuer_key = issuer.public_key().map_err(chain_err)?;

        let signed = subject.verify(&issuer_key).map_err(|e| {
            Error::InvalidCertificateChain(format!("verifying {name} certificate: {e}"))
        })?;

        if !signed {
            return Err(Error::InvalidCertificateChain(format!(
                "{name} certificate is not signed by its issuer"
            )));
        }
    }

    let mut store = X509StoreBuilder::new().map_err(chain_err)?;
    store.add_cert(certs.root.clone()).map_err(chain_err)?;

    let mut param = X509VerifyParam::new().map_err(chain_err)?;
    param.set_time(unix_time(now).map_err(chain_err)? as _);
    store.set_param(&param).map_err(chain_err)?;
    let store = store.build();

    let mut untrusted = Stack::new().map_err(chain_err)?;
    untrusted.push(certs.intermediate.clone()).map_err(chain_err)?;

    let mut ctx = X509StoreContext::new().map_err(chain_err)?;

    let (ok, reason) = ctx
        .init(&store, &certs.leaf, &untrusted, |c| {
            let ok = c.verify_cert()?;
            Ok((ok, c.error().error_string()))
        })
        .map_err(chain_err)?;

    if !ok {
        return Err(Error::InvalidCertificateChain(format!(
            "certificate chain verification failed: {reason}"
        )));
    }

    Ok(())
}

fn leaf_decoding_key(leaf: &X509Ref) -> Result<DecodingKey, Error> {
    let der = leaf
        .public_key()
        .and_then(|k| k.rsa())
        .and_then(|k| k.public_key_to_der_pkcs1())
        .map_err(|e| Error::Validation(format!("extracting leaf public key: {e}")))?;

    Ok(DecodingKey::from_rsa_der(&der))
}
