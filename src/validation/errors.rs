// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("unsupported algorithm: got {found}, expected {expected}")]
    UnsupportedAlgorithm { found: String, expected: String },
    #[error("Certificate parsing error: {0}")]
    CertificateParsing(String),
    #[error("Invalid certificate chain: {0}")]
    InvalidCertificateChain(String),
    #[error("Signature validation error: {0}")]
    SignatureValidation(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::CertificateParsing(e)
            | Error::InvalidCertificateChain(e)
            | Error::SignatureValidation(e)
            | Error::Validation(e) => {
                write!(f, "{}", e)
            }
            Error::UnsupportedAlgorithm { found, expected } => {
                write!(f, "got {}, expected {}", found, expected)
            }
        }
    }
}
