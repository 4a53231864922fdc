//! Fixed-width 32-byte values: content references and registry node ids.

use crate::address::{decode_hex_padded, encode_hex_prefixed, HexError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of raw bytes in a word-sized value.
pub const WORD_BYTES: usize = 32;

/// An opaque 32-byte value, e.g. a content hash pointing at off-registry data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bytes32(pub [u8; WORD_BYTES]);

impl Bytes32 {
    pub const ZERO: Bytes32 = Bytes32([0u8; WORD_BYTES]);

    pub fn as_bytes(&self) -> &[u8; WORD_BYTES] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; WORD_BYTES]
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_hex_prefixed(&self.0))
    }
}

impl FromStr for Bytes32 {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex_padded::<WORD_BYTES>(s).map(Bytes32)
    }
}

impl From<[u8; WORD_BYTES]> for Bytes32 {
    fn from(value: [u8; WORD_BYTES]) -> Self {
        Bytes32(value)
    }
}

impl From<Bytes32> for String {
    fn from(value: Bytes32) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Bytes32 {
    type Error = HexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Identifier of a position in the domain tree, derived from a full name.
///
/// Node ids are never constructed from user input directly in normal use;
/// they come out of `namehash`. Parsing is provided for wire decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(pub [u8; WORD_BYTES]);

impl NodeId {
    /// The tree root, `namehash("")`.
    pub const ROOT: NodeId = NodeId([0u8; WORD_BYTES]);

    pub fn as_bytes(&self) -> &[u8; WORD_BYTES] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_hex_prefixed(&self.0))
    }
}

impl FromStr for NodeId {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex_padded::<WORD_BYTES>(s).map(NodeId)
    }
}

impl From<[u8; WORD_BYTES]> for NodeId {
    fn from(value: [u8; WORD_BYTES]) -> Self {
        NodeId(value)
    }
}

impl From<NodeId> for String {
    fn from(value: NodeId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for NodeId {
    type Error = HexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
