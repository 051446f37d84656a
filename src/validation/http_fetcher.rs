// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::IWellKnownFetcher;
use reqwest::StatusCode;
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches well-known documents over HTTP(S).  Every call builds its own
/// client so that no connection outlives the request; nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl IWellKnownFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Validation(format!("building HTTP client: {e}")))?;

        let res = client
            .get(url)
            .send()
            .map_err(|e| Error::Validation(format!("fetching {url}: {e}")))?;

        let status = res.status();

        tracing::debug!(url, %status, "well_known_fetch");

        if status != StatusCode::OK {
            return Err(Error::Validation(format!(
                "failed to fetch {url}: {}",
                status.as_u16()
            )));
        }

        let body = res
            .bytes()
            .map_err(|e| Error::Validation(format!("reading {url}: {e}")))?;

        Ok(body.to_vec())
    }
}
