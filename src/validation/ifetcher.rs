// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;

/// Interface to the source of the issuer's well-known documents (discovery
/// metadata, JWKS, root certificate).
pub trait IWellKnownFetcher: Send + Sync {
    /// Fetch the body found at `url`.  Anything other than a 200 answer is an
    /// error.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, Error>;
}
