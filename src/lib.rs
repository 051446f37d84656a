// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Confidential Space vTPM attestation tokens.
//!
//! This crate provides an API to obtain and verify the attestation tokens
//! that Google Confidential Space issues to a workload running in a
//! confidential VM.
//!
//! The API allows:
//! * Requesting a nonce-bound token from the local launcher ([`attestation`])
//! * Verifying an OIDC token against the issuer's published key set
//! * Verifying a PKI token against its embedded certificate chain and the
//!   pinned Confidential Space root ([`validation`])

pub mod attestation;
pub mod validation;
