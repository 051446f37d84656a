// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::connection::Connection;
use super::errors::Error;
use super::nonce::check_nonces;
use super::simulate::SimulatedToken;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TOKEN_URL: &str = "/v1/token";
pub const DEFAULT_SOCKET_PATH: &str = "/run/container_launcher/teeserver.sock";
pub const DEFAULT_AUDIENCE: &str = "https://sts.google.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The kind of token requested from the attestation endpoint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum TokenType {
    /// Signed with a key published in the issuer's JWKS
    #[default]
    #[serde(rename = "OIDC")]
    Oidc,
    /// Signed with a key certified by an x5c chain carried in the header
    #[serde(rename = "PKI")]
    Pki,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Oidc => write!(f, "OIDC"),
            TokenType::Pki => write!(f, "PKI"),
        }
    }
}

impl FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OIDC" => Ok(TokenType::Oidc),
            "PKI" => Ok(TokenType::Pki),
            other => Err(format!("unknown token type {other}, expecting OIDC or PKI")),
        }
    }
}

/// Body of the `POST` sent to the attestation endpoint
#[derive(Debug, Serialize)]
pub struct AttestationRequest<'a> {
    pub audience: &'a str,
    pub token_type: TokenType,
    pub nonces: Vec<&'a str>,
}

/// Requests nonce-bound attestation tokens from the local Confidential Space
/// launcher over its unix socket.  In simulation mode a fixed, pre-generated
/// token is returned instead and no socket is touched.
#[derive(Debug)]
pub struct AttestationClient {
    url: String,
    socket_path: PathBuf,
    timeout: Duration,
    simulated: Option<SimulatedToken>,
}

impl Default for AttestationClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AttestationClient {
    /// Return a client for the default launcher socket
    pub fn new() -> Self {
        Self {
            url: DEFAULT_TOKEN_URL.to_string(),
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            timeout: DEFAULT_TIMEOUT,
            simulated: None,
        }
    }

    /// Return a client in simulation mode, serving the token stored at `path`
    pub fn simulated<P: AsRef<Path>>(path: P) -> Self {
        Self {
            simulated: Some(SimulatedToken::new(path)),
            ..Self::new()
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn with_socket_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.socket_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_simulated(&self) -> bool {
        self.simulated.is_some()
    }

    /// Request a token bound to `nonces` for `audience`.
    ///
    /// Nonces are length-checked before anything else happens.  The returned
    /// string is the endpoint's response body, verbatim: it is neither parsed
    /// nor verified here.
    pub fn get_token<S: AsRef<str>>(
        &self,
        nonces: &[S],
        audience: &str,
        token_type: TokenType,
    ) -> Result<String, Error> {
        check_nonces(nonces)?;

        if let Some(sim) = &self.simulated {
            let token = sim.get()?;
            tracing::debug!(token, "sim_token");
            return Ok(token.to_string());
        }

        let request = AttestationRequest {
            audience,
            token_type,
            nonces: nonces.iter().map(AsRef::as_ref).collect(),
        };

        let body = serde_json::to_vec(&request)
            .map_err(|e| Error::Transport(format!("encoding request: {e}")))?;

        let conn = Connection::open(&self.socket_path, self.timeout)?;
        let res = conn.post_json(&self.url, &body)?;

        if !res.is_success() {
            tracing::warn!(status = res.status, reason = %res.reason, "attestation_failed");
            return Err(Error::Status {
                status: res.status,
                reason: res.reason,
            });
        }

        let token = String::from_utf8(res.body)
            .map_err(|e| Error::Transport(format!("token is not UTF-8: {e}")))?;

        tracing::debug!(%token_type, token = %token, "token");

        Ok(token)
    }
}
