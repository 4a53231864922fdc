//! Recursive name hashing.
//!
//! `namehash("") = 0x00…00` and
//! `namehash(label.rest) = keccak256(namehash(rest) || keccak256(label))`.
//! A node id can only be derived by walking every ancestor from the root.

use crate::hash_functions::{keccak256, HashFunction, Keccak256};
use namereg_types::{Bytes32, Name, NameError, NodeId};

/// Hash of a single label.
pub fn labelhash(label: &str) -> Bytes32 {
    Bytes32(keccak256(label.as_bytes()))
}

/// Derive the child node id from a parent node id and a label hash.
pub fn subnode(parent: &NodeId, label: &Bytes32) -> NodeId {
    NodeId(Keccak256.hash_parts(&[parent.as_bytes(), label.as_bytes()]))
}

/// Node id of a validated name.
pub fn namehash(name: &Name) -> NodeId {
    name.labels()
        .fold(NodeId::ROOT, |node, label| subnode(&node, &labelhash(label)))
}

/// Validate and hash a raw dotted name.
pub fn namehash_str(name: &str) -> Result<NodeId, NameError> {
    Name::parse(name).map(|name| namehash(&name))
}

/// Four-byte function selector for a canonical signature such as
/// `owner(bytes32)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}
