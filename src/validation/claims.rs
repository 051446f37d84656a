// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use std::collections::HashSet;

/// The verified payload of a token
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Verify an RS256 signature over `token` with `key` and return its claims.
///
/// `exp` is enforced with no leeway when present but is not required.  The
/// audience is not checked.
pub(crate) fn verify_rs256(
    token: &str,
    key: &DecodingKey,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut v = Validation::new(Algorithm::RS256);
    v.leeway = 0;
    v.validate_aud = false;
    v.required_spec_claims = HashSet::new();

    let data = jsonwebtoken::decode::<Claims>(token.trim(), key, &v)?;

    Ok(data.claims)
}
