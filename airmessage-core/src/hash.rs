//! String Hashing
//!
//! Cheap, non-cryptographic hash codes for bucketing and identity checks
//! (for example, picking a stable avatar color for an address).

/// Generates a 32-bit hash code from a string
///
/// Accumulates `hash * 31 + unit` over the string's UTF-16 code units,
/// wrapping to a signed 32-bit integer on every step. Collisions are expected.
///
/// ```rust
/// use airmessage_core::hash::hash_string;
///
/// assert_eq!(hash_string(""), 0);
/// assert_eq!(hash_string("a"), 97);
/// ```
pub fn hash_string(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string() {
        assert_eq!(hash_string(""), 0);
    }

    #[test]
    fn test_known_values() {
        assert_eq!(hash_string("ab"), 97 * 31 + 98);
        assert_eq!(hash_string("hello"), 99162322);
        // Overflows 32 bits partway through
        assert_eq!(hash_string("hello world"), 1794106052);
    }

    #[test]
    fn test_deterministic() {
        let address = "+15551234567";
        assert_eq!(hash_string(address), hash_string(address));
        assert_ne!(hash_string(address), hash_string("+15551234568"));
    }

    #[test]
    fn test_hashes_utf16_code_units() {
        // U+1F600 is encoded as the surrogate pair D83D DE00
        let expected = 0xD83Di32.wrapping_mul(31).wrapping_add(0xDE00);
        assert_eq!(hash_string("\u{1F600}"), expected);
    }
}
