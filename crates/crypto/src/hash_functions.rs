//! Hash functions used by the name registry.
//!
//! The registry contracts key everything by Keccak-256 (the pre-standard
//! SHA-3 padding), so that is the only digest exposed here.

use sha3::{Digest, Keccak256 as KeccakHasher};

/// Trait for hash functions
pub trait HashFunction {
    /// Hash input data and return a fixed-size array
    fn hash_fixed(&self, data: &[u8]) -> [u8; 32];

    /// Hash the concatenation of several inputs without an intermediate buffer
    fn hash_parts(&self, parts: &[&[u8]]) -> [u8; 32];

    /// Get the name of the hash function
    fn name(&self) -> &'static str;
}

/// Keccak256 hash implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256;

impl Keccak256 {
    /// Create a new Keccak256 instance
    pub fn new() -> Self {
        Self
    }
}

impl HashFunction for Keccak256 {
    fn hash_fixed(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = KeccakHasher::new();
        hasher.update(data);
        hasher.finalize().into()
    }

    fn hash_parts(&self, parts: &[&[u8]]) -> [u8; 32] {
        let mut hasher = KeccakHasher::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().into()
    }

    fn name(&self) -> &'static str {
        "Keccak256"
    }
}

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256.hash_fixed(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty_input() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_keccak256_parts_match_concatenation() {
        let hasher = Keccak256::new();
        assert_eq!(
            hasher.hash_parts(&[b"foo", b"bar"]),
            hasher.hash_fixed(b"foobar")
        );
        assert_eq!(hasher.name(), "Keccak256");
    }
}
