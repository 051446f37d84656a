// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::claims::Claims;
use super::errors::Error;
use super::header::Scheme;
use super::oidc::OidcValidator;
use super::pki::PkiValidator;
use super::{HttpFetcher, IWellKnownFetcher, TrustAnchor};

pub const DEFAULT_ISSUER: &str = "https://confidentialcomputing.googleapis.com";
pub const DEFAULT_DISCOVERY_PATH: &str = "/.well-known/openid-configuration";
pub const DEFAULT_ROOT_PATH: &str = "/.well-known/confidential_space_root.crt";

/// Validates Confidential Space attestation tokens of either scheme.
///
/// The scheme is picked from the token header alone; issuer documents are
/// fetched afresh on every call and nothing is cached between calls.
pub struct Validator {
    issuer: String,
    discovery_path: String,
    root_path: String,
    anchor: TrustAnchor,
    fetcher: Box<dyn IWellKnownFetcher>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            discovery_path: DEFAULT_DISCOVERY_PATH.to_string(),
            root_path: DEFAULT_ROOT_PATH.to_string(),
            anchor: TrustAnchor::default(),
            fetcher: Box::<HttpFetcher>::default(),
        }
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.issuer = issuer.trim_end_matches('/').to_string();
        self
    }

    pub fn with_discovery_path(mut self, path: &str) -> Self {
        self.discovery_path = path.to_string();
        self
    }

    pub fn with_root_path(mut self, path: &str) -> Self {
        self.root_path = path.to_string();
        self
    }

    /// Pin a root other than the Confidential Space one
    pub fn with_trust_anchor(mut self, anchor: TrustAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_fetcher<F: IWellKnownFetcher + 'static>(mut self, fetcher: F) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn trust_anchor(&self) -> &TrustAnchor {
        &self.anchor
    }

    pub fn discovery_url(&self) -> String {
        format!("{}{}", self.issuer, self.discovery_path)
    }

    pub fn root_url(&self) -> String {
        format!("{}{}", self.issuer, self.root_path)
    }

    /// Verify `token` and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, Error> {
        let res = match Scheme::detect(token)? {
            Scheme::Pki { x5c } => PkiValidator {
                fetcher: self.fetcher.as_ref(),
                root_url: self.root_url(),
                anchor: &self.anchor,
            }
            .validate(token, &x5c),
            Scheme::Oidc { kid } => OidcValidator {
                fetcher: self.fetcher.as_ref(),
                discovery_url: self.discovery_url(),
            }
            .validate(token, kid.as_deref()),
        };

        res.map_err(|e| {
            tracing::warn!(error = %e, "token_validation_failed");
            e
        })
    }
}
