//! Hashing primitives for the name registry: Keccak-256, label and name
//! hashing, and contract function selectors.

pub mod hash_functions;
pub mod namehash;

pub use hash_functions::{keccak256, HashFunction, Keccak256};
pub use namehash::{labelhash, namehash, namehash_str, selector, subnode};
