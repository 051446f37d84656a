// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! The attestation module provides an [`AttestationClient`] that requests
//! nonce-bound attestation tokens from the Confidential Space launcher.
//!
//! # Example
//!
//! ```no_run
//! use vtpmtoken::attestation::{AttestationClient, TokenType};
//!
//! let client = AttestationClient::new();
//!
//! let token = client
//!     .get_token(&["0123456789abcdef"], "https://example.test", TokenType::Pki)
//!     .expect("requesting attestation token");
//! ```

pub use self::client::*;
pub use self::errors::Error;
pub use self::nonce::{check_nonces, MAX_NONCE_LEN, MIN_NONCE_LEN};
pub use self::simulate::{SimulatedToken, DEFAULT_SIMULATED_TOKEN_PATH};

mod client;
mod connection;
mod errors;
mod nonce;
mod simulate;
