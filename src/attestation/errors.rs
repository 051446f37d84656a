// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("nonce length out of range: nonce '{nonce}' is {len} bytes, must be between {min} and {max} bytes")]
    NonceLength {
        nonce: String,
        len: usize,
        min: usize,
        max: usize,
    },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Failed to get attestation response: {status} {reason}")]
    Status { status: u16, reason: String },
    #[error("Simulation error: {0}")]
    Simulation(String),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Transport(e) | Error::Simulation(e) => {
                write!(f, "{}", e)
            }
            e @ (Error::NonceLength { .. } | Error::Status { .. }) => {
                write!(f, "{}", e)
            }
        }
    }
}
