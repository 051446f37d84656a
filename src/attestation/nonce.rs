// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;

/// Smallest accepted nonce, in UTF-8 bytes
pub const MIN_NONCE_LEN: usize = 10;
/// Largest accepted nonce, in UTF-8 bytes
pub const MAX_NONCE_LEN: usize = 74;

/// Check that every nonce is between [`MIN_NONCE_LEN`] and [`MAX_NONCE_LEN`]
/// bytes (inclusive) once UTF-8 encoded.  The first offending nonce is
/// reported.
pub fn check_nonces<S: AsRef<str>>(nonces: &[S]) -> Result<(), Error> {
    for nonce in nonces {
        let nonce = nonce.as_ref();
        let len = nonce.len();

        tracing::debug!(byte_len = len, "nonce_length");

        if !(MIN_NONCE_LEN..=MAX_NONCE_LEN).contains(&len) {
            return Err(Error::NonceLength {
                nonce: nonce.to_string(),
                len,
                min: MIN_NONCE_LEN,
                max: MAX_NONCE_LEN,
            });
        }
    }

    Ok(())
}
