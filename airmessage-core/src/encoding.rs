//! Binary/text encoding helpers

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::Result;

/// Encodes the passed bytes to a standard base64 string
pub fn encode_base64(value: &[u8]) -> String {
    STANDARD.encode(value)
}

/// Decodes a standard base64 string to bytes
pub fn decode_base64(value: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(value)?)
}

/// Encodes bytes to a lowercase hex string, two digits per byte
pub fn to_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decodes a hex string produced by [`to_hex`]
pub fn from_hex(value: &str) -> Result<Vec<u8>> {
    Ok(hex::decode(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreError;

    #[test]
    fn test_encode_known_value() {
        assert_eq!(encode_base64(b"AirMessage"), "QWlyTWVzc2FnZQ==");
        assert_eq!(encode_base64(&[]), "");
    }

    #[test]
    fn test_decode_restores_bytes() {
        let data: Vec<u8> = (0..=255).collect();
        let decoded = decode_base64(&encode_base64(&data)).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_decode_invalid() {
        let result = decode_base64("not base64!");
        assert!(matches!(result, Err(CoreError::Base64(_))));
    }

    #[test]
    fn test_hex() {
        assert_eq!(to_hex(&[0x00, 0x0f, 0xab, 0xff]), "000fabff");
        assert_eq!(from_hex("000fabff").unwrap(), vec![0x00, 0x0f, 0xab, 0xff]);
        assert!(matches!(from_hex("zz"), Err(CoreError::Hex(_))));
    }
}
