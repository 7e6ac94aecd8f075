//! Byte encoding for values that cross the trust boundary.
//!
//! One variant project-wide: URL-safe alphabet, no padding. Sealing and
//! opening must agree bit-for-bit, so standard-alphabet or padded input is
//! rejected with `InvalidEncoding` instead of being decoded leniently.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::error::{VaultError, VaultResult};

pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode a persisted value. `field` names the value in the error.
pub fn decode(value: &str, field: &'static str) -> VaultResult<Vec<u8>> {
    if value.is_empty() {
        return Err(VaultError::MissingParameter(field));
    }
    URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|_| VaultError::InvalidEncoding(field))
}

/// Decode into a fixed-size array.
pub fn decode_array<const N: usize>(value: &str, field: &'static str) -> VaultResult<[u8; N]> {
    decode(value, field)?
        .try_into()
        .map_err(|_| VaultError::InvalidEncoding(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    #[test]
    fn test_output_is_url_safe_unpadded() {
        let encoded = encode([0xfbu8, 0xff, 0xfe, 0x01]);
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert_eq!(decode(&encoded, "value").unwrap(), vec![0xfb, 0xff, 0xfe, 0x01]);
    }

    #[test]
    fn test_standard_variant_fails_loudly() {
        let standard = STANDARD.encode([0xfbu8, 0xff, 0xfe, 0x01]);
        assert!(matches!(
            decode(&standard, "sealed"),
            Err(VaultError::InvalidEncoding("sealed"))
        ));
    }

    #[test]
    fn test_wrong_length_array() {
        let encoded = encode([1u8; 5]);
        assert!(decode_array::<32>(&encoded, "public key").is_err());
    }

    #[test]
    fn test_empty_is_missing() {
        assert!(matches!(
            decode("", "nonce"),
            Err(VaultError::MissingParameter("nonce"))
        ));
    }
}
