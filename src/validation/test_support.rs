// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Synthetic keys, certificate chains and tokens for the validation tests

use super::trustanchor::{fingerprint, TrustAnchor};
use ::base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::extension::{BasicConstraints, KeyUsage};
use openssl::x509::{X509NameBuilder, X509};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const DAY: i64 = 24 * 60 * 60;

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// A plausible Confidential Space claims-set expiring `exp_offset` seconds
/// from now
pub fn sample_claims(exp_offset: i64) -> Value {
    let now = unix_now();

    json!({
        "iss": "https://confidentialcomputing.googleapis.com",
        "aud": "https://sts.google.com",
        "sub": "https://www.googleapis.com/compute/v1/projects/p/zones/z/instances/i",
        "iat": now - 60,
        "exp": now + exp_offset,
        "eat_nonce": ["0123456789abcdef"],
        "hwmodel": "GCP_INTEL_TDX",
        "swname": "CONFIDENTIAL_SPACE",
        "secboot": true,
    })
}

/// Base64 DER, as found in an x5c array
pub fn x5c_member(cert: &X509) -> String {
    STANDARD.encode(cert.to_der().unwrap())
}

pub fn anchor_for(root: &X509) -> TrustAnchor {
    TrustAnchor::new(&fingerprint(root).unwrap())
}

/// An RSA-2048 signing key
pub struct TestKey {
    pub rsa: Rsa<Private>,
}

impl TestKey {
    pub fn generate() -> Self {
        Self {
            rsa: Rsa::generate(2048).unwrap(),
        }
    }

    pub fn pkey(&self) -> PKey<Private> {
        PKey::from_rsa(self.rsa.clone()).unwrap()
    }

    /// The public half as a JWKS entry
    pub fn jwk(&self, kid: &str) -> Value {
        json!({
            "kty": "RSA",
            "alg": "RS256",
            "use": "sig",
            "kid": kid,
            "n": URL_SAFE_NO_PAD.encode(self.rsa.n().to_vec()),
            "e": URL_SAFE_NO_PAD.encode(self.rsa.e().to_vec()),
        })
    }

    fn sign(&self, header: &Header, claims: &Value) -> String {
        let key = EncodingKey::from_rsa_der(&self.rsa.private_key_to_der().unwrap());

        jsonwebtoken::encode(header, claims, &key).unwrap()
    }

    pub fn sign_oidc(&self, kid: &str, claims: &Value) -> String {
        let mut h = Header::new(Algorithm::RS256);
        h.kid = Some(kid.to_string());

        self.sign(&h, claims)
    }

    pub fn sign_pki(&self, x5c: &[String], claims: &Value) -> String {
        let mut h = Header::new(Algorithm::RS256);
        h.x5c = Some(x5c.to_vec());

        self.sign(&h, claims)
    }
}

/// Knobs to produce broken chains
#[derive(Default)]
pub struct PkiOptions {
    /// Reuse this root instead of minting a new one
    pub root: Option<(TestKey, X509)>,
    pub intermediate_expired: bool,
    pub leaf_not_yet_valid: bool,
    /// Digest used by the intermediate to sign the leaf (default SHA-256)
    pub leaf_digest: Option<MessageDigest>,
    /// Give the leaf a P-256 key instead of RSA
    pub leaf_ec: bool,
}

/// A root, intermediate and leaf chain
pub struct TestPki {
    pub root_key: TestKey,
    pub root: X509,
    pub intermediate_key: TestKey,
    pub intermediate: X509,
    pub leaf_key: TestKey,
    pub leaf: X509,
}

impl TestPki {
    pub fn new() -> Self {
        Self::with(PkiOptions::default())
    }

    pub fn with(opts: PkiOptions) -> Self {
        let now = unix_now();
        let valid = (now - DAY, now + 3650 * DAY);

        let (root_key, root) = match opts.root {
            Some(r) => r,
            None => {
                let k = TestKey::generate();
                let c = make_cert(
                    "Test Root CA",
                    &k.pkey(),
                    None,
                    true,
                    valid,
                    MessageDigest::sha256(),
                );
                (k, c)
            }
        };

        let intermediate_key = TestKey::generate();
        let intermediate_validity = if opts.intermediate_expired {
            (now - 30 * DAY, now - DAY)
        } else {
            valid
        };
        let intermediate = make_cert(
            "Test Intermediate CA",
            &intermediate_key.pkey(),
            Some((&root, &root_key.pkey())),
            true,
            intermediate_validity,
            MessageDigest::sha256(),
        );

        let leaf_key = TestKey::generate();
        let leaf_pkey = if opts.leaf_ec {
            let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
            PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
        } else {
            leaf_key.pkey()
        };
        let leaf_validity = if opts.leaf_not_yet_valid {
            (now + DAY, now + 30 * DAY)
        } else {
            valid
        };
        let leaf = make_cert(
            "Test Attestation Signer",
            &leaf_pkey,
            Some((&intermediate, &intermediate_key.pkey())),
            false,
            leaf_validity,
            opts.leaf_digest.unwrap_or_else(MessageDigest::sha256),
        );

        Self {
            root_key,
            root,
            intermediate_key,
            intermediate,
            leaf_key,
            leaf,
        }
    }

    /// A copy of the root key and certificate, to mint sibling chains
    pub fn root_material(&self) -> (TestKey, X509) {
        (
            TestKey {
                rsa: self.root_key.rsa.clone(),
            },
            self.root.clone(),
        )
    }

    pub fn x5c(&self) -> Vec<String> {
        vec![
            x5c_member(&self.leaf),
            x5c_member(&self.intermediate),
            x5c_member(&self.root),
        ]
    }

    /// A PKI token over `claims` signed by the leaf key
    pub fn sign(&self, claims: &Value) -> String {
        self.leaf_key.sign_pki(&self.x5c(), claims)
    }
}

impl Default for TestPki {
    fn default() -> Self {
        Self::new()
    }
}

/// Issue a certificate for `key`.  Without an issuer the certificate is
/// self-signed.
fn make_cert(
    cn: &str,
    key: &PKey<Private>,
    issuer: Option<(&X509, &PKey<Private>)>,
    ca: bool,
    (not_before, not_after): (i64, i64),
    digest: MessageDigest,
) -> X509 {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", cn).unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();

    let serial = BigNum::from_u32(rand_serial()).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();

    builder.set_subject_name(&name).unwrap();
    builder.set_pubkey(key).unwrap();
    builder
        .set_not_before(&Asn1Time::from_unix(not_before as _).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::from_unix(not_after as _).unwrap())
        .unwrap();

    if ca {
        builder
            .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
            .unwrap();
        builder
            .append_extension(
                KeyUsage::new()
                    .critical()
                    .key_cert_sign()
                    .crl_sign()
                    .build()
                    .unwrap(),
            )
            .unwrap();
    } else {
        builder
            .append_extension(KeyUsage::new().critical().digital_signature().build().unwrap())
            .unwrap();
    }

    match issuer {
        Some((issuer_cert, issuer_key)) => {
            builder.set_issuer_name(issuer_cert.subject_name()).unwrap();
            builder.sign(issuer_key, digest).unwrap();
        }
        None => {
            builder.set_issuer_name(&name).unwrap();
            builder.sign(key, digest).unwrap();
        }
    }

    builder.build()
}

fn rand_serial() -> u32 {
    let mut b = [0u8; 4];
    openssl::rand::rand_bytes(&mut b).unwrap();
    u32::from_be_bytes(b) & 0x7fff_ffff
}
