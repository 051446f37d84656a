// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! The validation module verifies Confidential Space attestation tokens.
//!
//! A token is either signed by a key that the issuer publishes in its JWKS
//! (OIDC scheme) or by the leaf of a leaf/intermediate/root certificate chain
//! carried in its `x5c` header (PKI scheme).  [`Validator::validate_token`]
//! picks the scheme from the header and returns the verified claims.
//!
//! # Example
//!
//! ```no_run
//! use vtpmtoken::validation::Validator;
//!
//! let token = std::fs::read_to_string("token.jwt").expect("reading token");
//!
//! let claims = Validator::new()
//!     .validate_token(&token)
//!     .expect("validating token");
//!
//! println!("{}", serde_json::to_string_pretty(&claims).unwrap());
//! ```
//!
//! Issuer documents can be provided offline through a [`MemoFetcher`]:
//!
//! ```no_run
//! use vtpmtoken::validation::{MemoFetcher, Validator};
//!
//! let root = std::fs::read("confidential_space_root.crt").expect("reading root");
//!
//! let v = Validator::new().with_fetcher(MemoFetcher::new().with(
//!     "https://confidentialcomputing.googleapis.com/.well-known/confidential_space_root.crt",
//!     root,
//! ));
//! ```

pub use self::base64::Bytes;
pub use self::chain::{decode_der_certificate, PkiCertificates};
pub use self::claims::Claims;
pub use self::errors::Error;
pub use self::header::{Header, Scheme, ALGO};
pub use self::http_fetcher::{HttpFetcher, DEFAULT_FETCH_TIMEOUT};
pub use self::ifetcher::IWellKnownFetcher;
pub use self::memo_fetcher::MemoFetcher;
pub use self::oidc::{KeySetEntry, OidcValidator};
pub use self::pki::PkiValidator;
pub use self::trustanchor::{fingerprint, TrustAnchor, CONFIDENTIAL_SPACE_ROOT_FINGERPRINT};
pub use self::validator::*;

mod base64;
mod chain;
mod claims;
mod errors;
mod header;
mod http_fetcher;
mod ifetcher;
mod memo_fetcher;
mod oidc;
mod pki;
#[cfg(test)]
mod test_support;
mod trustanchor;
mod validator;
