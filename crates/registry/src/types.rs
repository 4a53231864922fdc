//! Call encoding types exchanged with the ledger gateway

use namereg_crypto::selector;
use namereg_types::{Address, Bytes32, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contract functions issued by the clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    // Registry
    Owner,
    Resolver,
    Ttl,
    SetOwner,
    SetSubnodeOwner,
    SetResolver,
    SetTtl,
    // Resolver
    Addr,
    SetAddr,
    Content,
    SetContent,
}

impl Function {
    pub const ALL: [Function; 11] = [
        Function::Owner,
        Function::Resolver,
        Function::Ttl,
        Function::SetOwner,
        Function::SetSubnodeOwner,
        Function::SetResolver,
        Function::SetTtl,
        Function::Addr,
        Function::SetAddr,
        Function::Content,
        Function::SetContent,
    ];

    /// Canonical signature used to derive the selector.
    pub fn signature(&self) -> &'static str {
        match self {
            Function::Owner => "owner(bytes32)",
            Function::Resolver => "resolver(bytes32)",
            Function::Ttl => "ttl(bytes32)",
            Function::SetOwner => "setOwner(bytes32,address)",
            Function::SetSubnodeOwner => "setSubnodeOwner(bytes32,bytes32,address)",
            Function::SetResolver => "setResolver(bytes32,address)",
            Function::SetTtl => "setTTL(bytes32,uint64)",
            Function::Addr => "addr(bytes32)",
            Function::SetAddr => "setAddr(bytes32,address)",
            Function::Content => "content(bytes32)",
            Function::SetContent => "setContent(bytes32,bytes32)",
        }
    }

    pub fn selector(&self) -> [u8; 4] {
        selector(self.signature())
    }

    pub fn from_selector(bytes: [u8; 4]) -> Option<Function> {
        Self::ALL.into_iter().find(|f| f.selector() == bytes)
    }

    /// Name without the argument list, e.g. `setSubnodeOwner`.
    pub fn name(&self) -> &'static str {
        let signature = self.signature();
        match signature.find('(') {
            Some(idx) => &signature[..idx],
            None => signature,
        }
    }

    /// Number of 32-byte argument words the function takes.
    pub fn arity(&self) -> usize {
        match self {
            Function::Owner
            | Function::Resolver
            | Function::Ttl
            | Function::Addr
            | Function::Content => 1,
            Function::SetSubnodeOwner => 3,
            _ => 2,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single argument; every variant encodes to one 32-byte word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Node(NodeId),
    FixedBytes(Bytes32),
    Address(Address),
    Uint(u64),
}

impl Token {
    pub fn to_word(&self) -> [u8; 32] {
        match self {
            Token::Node(node) => node.0,
            Token::FixedBytes(bytes) => bytes.0,
            Token::Address(address) => address.to_word(),
            Token::Uint(value) => {
                let mut word = [0u8; 32];
                word[24..].copy_from_slice(&value.to_be_bytes());
                word
            }
        }
    }
}

/// A fully-formed request against one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub contract: Address,
    pub function: Function,
    pub args: Vec<Token>,
}

impl CallRequest {
    pub fn new(contract: Address, function: Function, args: Vec<Token>) -> Self {
        Self {
            contract,
            function,
            args,
        }
    }

    /// Selector followed by one word per argument.
    pub fn calldata(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(4 + self.args.len() * 32);
        data.extend_from_slice(&self.function.selector());
        for arg in &self.args {
            data.extend_from_slice(&arg.to_word());
        }
        data
    }
}

/// Raw bytes returned by a read-only call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnData(pub Vec<u8>);

impl ReturnData {
    pub fn from_word(word: [u8; 32]) -> Self {
        Self(word.to_vec())
    }

    pub fn word(&self, index: usize) -> Option<[u8; 32]> {
        let start = index.checked_mul(32)?;
        let end = start.checked_add(32)?;
        let slice = self.0.get(start..end)?;
        let mut word = [0u8; 32];
        word.copy_from_slice(slice);
        Some(word)
    }

    pub fn as_address(&self) -> Option<Address> {
        self.word(0).map(|w| Address::from_word(&w))
    }

    pub fn as_bytes32(&self) -> Option<Bytes32> {
        self.word(0).map(Bytes32)
    }

    pub fn as_u64(&self) -> Option<u64> {
        let word = self.word(0)?;
        if word[..24].iter().any(|b| *b != 0) {
            return None;
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&word[24..]);
        Some(u64::from_be_bytes(buf))
    }
}

/// Proof that a state-changing call was executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub tx_hash: Bytes32,
    pub sender: Address,
    pub contract: Address,
    pub function: Function,
}
