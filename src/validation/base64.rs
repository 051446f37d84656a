// SPDX-License-Identifier: Apache-2.0

use base64::{
    alphabet,
    engine::{general_purpose, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use serde::de::{self, Deserialize, Visitor};

use super::errors::Error;

/// base64url, with or without trailing padding
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// decodes bytes from a base64url-encoded string; padding is optional
pub fn decode_str(v: &str) -> Result<Vec<u8>, Error> {
    URL_SAFE_LENIENT
        .decode(v)
        .map_err(|e| Error::Validation(format!("base64url decoding failed: {e}")))
}

/// decodes bytes from a standard base64 string (as used by the x5c header)
pub fn decode_std(v: &str) -> Result<Vec<u8>, Error> {
    general_purpose::STANDARD
        .decode(v)
        .map_err(|e| Error::CertificateParsing(format!("base64 decoding failed: {e}")))
}

/// a `Vec<u8>` encoded as base64url in JSON documents (e.g., the `n` and `e`
/// members of a JWK)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Bytes(Vec::new())
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl Default for Bytes {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&[u8]> for Bytes {
    fn from(v: &[u8]) -> Self {
        Self(v.to_owned())
    }
}

impl TryFrom<&str> for Bytes {
    type Error = Error;

    fn try_from(v: &str) -> Result<Self, Error> {
        decode_str(v).map(Bytes)
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(BytesVisitor {})
    }
}

struct BytesVisitor;

impl<'de> Visitor<'de> for BytesVisitor {
    type Value = Bytes;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a base64url text string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Bytes::try_from(v).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_is_optional() {
        assert_eq!(decode_str("AQAB").unwrap(), vec![1, 0, 1]);
        assert_eq!(decode_str("AQ").unwrap(), vec![1]);
        assert_eq!(decode_str("AQ==").unwrap(), vec![1]);
    }

    #[test]
    fn url_alphabet() {
        assert_eq!(decode_str("-_8").unwrap(), vec![0xfb, 0xff]);
        assert!(decode_str("+/8").is_err());
    }

    #[test]
    fn bytes_from_json() {
        let b: Bytes = serde_json::from_str(r#""AQAB""#).unwrap();
        assert_eq!(b.as_slice(), &[1, 0, 1]);

        assert!(serde_json::from_str::<Bytes>(r#""not base64!""#).is_err());
        assert!(serde_json::from_str::<Bytes>("42").is_err());
    }

    #[test]
    fn std_alphabet_for_certificates() {
        assert_eq!(decode_std("+/8=").unwrap(), vec![0xfb, 0xff]);
        assert!(matches!(
            decode_std("-_8"),
            Err(Error::CertificateParsing(_))
        ));
    }
}
