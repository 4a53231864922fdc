use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing a fixed-width hex value.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum HexError {
    #[error("value must start with '0x'")]
    MissingPrefix,
    #[error("value must have between 1 and {max} hex digits, got {actual}")]
    InvalidLength { max: usize, actual: usize },
    #[error("value is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Number of raw bytes contained in an address.
pub const ADDRESS_BYTES: usize = 20;
/// Expected string length of an encoded address (`0x` + 40 hex chars).
pub const ADDRESS_STRING_LENGTH: usize = 2 + ADDRESS_BYTES * 2;

/// Encode raw bytes as lower-case, `0x`-prefixed hex.
pub fn encode_hex_prefixed(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(2 + bytes.len() * 2);
    encoded.push_str("0x");
    encoded.push_str(&hex::encode(bytes));
    encoded
}

/// Decode `0x`-prefixed hex into exactly `N` bytes.
///
/// Values shorter than `N` bytes are left-padded with zeros, so `0x12345`
/// decodes to `0x…012345`. An empty payload (`0x`) is rejected.
pub fn decode_hex_padded<const N: usize>(value: &str) -> Result<[u8; N], HexError> {
    let payload = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or(HexError::MissingPrefix)?;

    let max = N * 2;
    if payload.is_empty() || payload.len() > max {
        return Err(HexError::InvalidLength {
            max,
            actual: payload.len(),
        });
    }

    let mut padded = String::with_capacity(max);
    for _ in payload.len()..max {
        padded.push('0');
    }
    padded.push_str(payload);

    let mut out = [0u8; N];
    hex::decode_to_slice(&padded, &mut out)?;
    Ok(out)
}

/// A 20-byte account or contract identifier.
///
/// The zero address is the sentinel for "absent", "unset" and "unowned".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; ADDRESS_BYTES]);

impl Address {
    pub const ZERO: Address = Address([0u8; ADDRESS_BYTES]);

    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_BYTES]
    }

    /// Build an address from the low 20 bytes of a 32-byte word.
    pub fn from_word(word: &[u8; 32]) -> Self {
        let mut bytes = [0u8; ADDRESS_BYTES];
        bytes.copy_from_slice(&word[32 - ADDRESS_BYTES..]);
        Address(bytes)
    }

    /// Left-pad the address into a 32-byte word.
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[32 - ADDRESS_BYTES..].copy_from_slice(&self.0);
        word
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_hex_prefixed(&self.0))
    }
}

impl FromStr for Address {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex_padded::<ADDRESS_BYTES>(s).map(Address)
    }
}

impl From<[u8; ADDRESS_BYTES]> for Address {
    fn from(value: [u8; ADDRESS_BYTES]) -> Self {
        Address(value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Address {
    type Error = HexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_value_is_left_padded() {
        let addr: Address = "0x12345".parse().unwrap();
        assert_eq!(
            addr.to_string(),
            "0x0000000000000000000000000000000000012345"
        );
        assert_eq!(addr.to_string().len(), ADDRESS_STRING_LENGTH);
    }

    #[test]
    fn full_width_value_is_lowercased() {
        let addr: Address = "0xABCDEFabcdef0123456789ABCDEF0123456789ab".parse().unwrap();
        assert_eq!(addr.to_string(), "0xabcdefabcdef0123456789abcdef0123456789ab");
    }

    #[test]
    fn missing_prefix_rejected() {
        let err = "12345".parse::<Address>().unwrap_err();
        assert_eq!(err, HexError::MissingPrefix);
    }

    #[test]
    fn oversized_value_rejected() {
        let bad = format!("0x{}", "1".repeat(41));
        let err = bad.parse::<Address>().unwrap_err();
        assert!(matches!(err, HexError::InvalidLength { max: 40, actual: 41 }));
    }

    #[test]
    fn empty_payload_rejected() {
        assert!(matches!(
            "0x".parse::<Address>().unwrap_err(),
            HexError::InvalidLength { .. }
        ));
    }

    #[test]
    fn invalid_hex_rejected() {
        assert!(matches!(
            "0xzz".parse::<Address>().unwrap_err(),
            HexError::InvalidHex(_)
        ));
    }

    #[test]
    fn hex_errors_compare_by_value() {
        let first = "0xzz".parse::<Address>().unwrap_err();
        let second = "0xzz".parse::<Address>().unwrap_err();
        assert_eq!(first, second);
        assert_ne!(first, HexError::MissingPrefix);
    }

    #[test]
    fn word_conversion_keeps_low_bytes() {
        let addr = Address([0xAB; ADDRESS_BYTES]);
        let word = addr.to_word();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(Address::from_word(&word), addr);
    }

    #[test]
    fn zero_address_is_sentinel() {
        assert!(Address::ZERO.is_zero());
        assert!(Address::default().is_zero());
        assert!(!Address([1; ADDRESS_BYTES]).is_zero());
    }

    #[test]
    fn serde_uses_hex_string() {
        let addr: Address = "0x01".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x0000000000000000000000000000000000000001\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
