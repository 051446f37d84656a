// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::IWellKnownFetcher;
use std::collections::HashMap;

/// In-memory well-known documents, indexed by URL.  Useful to validate
/// tokens offline against pre-fetched issuer material.
#[derive(Debug, Default, Clone)]
pub struct MemoFetcher {
    docs: HashMap<String, Vec<u8>>,
}

impl MemoFetcher {
    /// Returns a new empty MemoFetcher
    pub fn new() -> Self {
        Self {
            docs: HashMap::new(),
        }
    }

    /// Serve `body` for `url`, replacing any previous document
    pub fn insert<B: Into<Vec<u8>>>(&mut self, url: &str, body: B) {
        self.docs.insert(url.to_string(), body.into());
    }

    pub fn with<B: Into<Vec<u8>>>(mut self, url: &str, body: B) -> Self {
        self.insert(url, body);
        self
    }
}

impl IWellKnownFetcher for MemoFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, Error> {
        self.docs
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Validation(format!("failed to fetch {url}: 404")))
    }
}
