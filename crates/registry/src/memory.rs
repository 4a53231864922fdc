//! In-memory ledger hosting one registry and one public resolver.
//!
//! Mirrors the authorization rules of the on-chain contracts closely enough
//! to drive the clients end to end without a node.

use crate::gateway::{GatewayError, LedgerGateway};
use crate::types::{CallRequest, Function, ReturnData, Token, TransactionReceipt};
use async_trait::async_trait;
use namereg_crypto::{keccak256, subnode};
use namereg_types::{Address, Bytes32, NodeId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default address the registry contract is "deployed" at.
pub const DEFAULT_REGISTRY_ADDRESS: Address = Address([0x11; 20]);
/// Default address the public resolver is "deployed" at.
pub const DEFAULT_RESOLVER_ADDRESS: Address = Address([0x22; 20]);

#[derive(Debug, Clone, Default)]
struct RegistryEntry {
    owner: Address,
    resolver: Address,
    ttl: u64,
}

#[derive(Debug, Clone, Default)]
struct ResolverEntry {
    addr: Option<Address>,
    content: Option<Bytes32>,
}

/// Stub ledger backed by in-memory hashmaps.
#[derive(Debug)]
pub struct InMemoryLedger {
    registry_address: Address,
    resolver_address: Address,
    records: Arc<RwLock<HashMap<NodeId, RegistryEntry>>>,
    resolutions: Arc<RwLock<HashMap<NodeId, ResolverEntry>>>,
    tx_counter: AtomicU64,
    /// Failure returned by the next gateway request, then cleared.
    injected_failure: RwLock<Option<GatewayError>>,
}

impl InMemoryLedger {
    /// Create a ledger whose root node is owned by `root_owner`.
    pub fn new(root_owner: Address) -> Self {
        Self::with_addresses(root_owner, DEFAULT_REGISTRY_ADDRESS, DEFAULT_RESOLVER_ADDRESS)
    }

    pub fn with_addresses(
        root_owner: Address,
        registry_address: Address,
        resolver_address: Address,
    ) -> Self {
        let mut records = HashMap::new();
        records.insert(
            NodeId::ROOT,
            RegistryEntry {
                owner: root_owner,
                ..Default::default()
            },
        );

        Self {
            registry_address,
            resolver_address,
            records: Arc::new(RwLock::new(records)),
            resolutions: Arc::new(RwLock::new(HashMap::new())),
            tx_counter: AtomicU64::new(0),
            injected_failure: RwLock::new(None),
        }
    }

    pub fn registry_address(&self) -> Address {
        self.registry_address
    }

    pub fn resolver_address(&self) -> Address {
        self.resolver_address
    }

    /// Make the next request fail with `error`.
    pub fn fail_next(&self, error: GatewayError) {
        *self.injected_failure.write() = Some(error);
    }

    /// Number of transactions executed so far.
    pub fn transaction_count(&self) -> u64 {
        self.tx_counter.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> Result<(), GatewayError> {
        match self.injected_failure.write().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn registry_read(&self, request: &CallRequest) -> Result<ReturnData, GatewayError> {
        let node = node_arg(request, 0)?;
        let records = self.records.read();
        let entry = records.get(&node).cloned().unwrap_or_default();
        let word = match request.function {
            Function::Owner => entry.owner.to_word(),
            Function::Resolver => entry.resolver.to_word(),
            Function::Ttl => Token::Uint(entry.ttl).to_word(),
            other => return Err(unsupported(other, "call")),
        };
        Ok(ReturnData::from_word(word))
    }

    fn resolver_read(&self, request: &CallRequest) -> Result<ReturnData, GatewayError> {
        let node = node_arg(request, 0)?;
        let resolutions = self.resolutions.read();
        let entry = resolutions.get(&node);
        let word = match request.function {
            Function::Addr => entry.and_then(|e| e.addr).map(|a| a.to_word()),
            Function::Content => entry.and_then(|e| e.content).map(|c| c.0),
            other => return Err(unsupported(other, "call")),
        };
        word.map(ReturnData::from_word)
            .ok_or_else(|| GatewayError::Revert("record not set".to_string()))
    }

    fn registry_write(&self, request: &CallRequest, sender: &Address) -> Result<(), GatewayError> {
        let node = node_arg(request, 0)?;
        let mut records = self.records.write();
        require_owner(&records, &node, sender)?;

        match request.function {
            Function::SetOwner => {
                let owner = address_arg(request, 1)?;
                records.entry(node).or_default().owner = owner;
            }
            Function::SetSubnodeOwner => {
                let label = bytes_arg(request, 1)?;
                let owner = address_arg(request, 2)?;
                records.entry(subnode(&node, &label)).or_default().owner = owner;
            }
            Function::SetResolver => {
                let resolver = address_arg(request, 1)?;
                records.entry(node).or_default().resolver = resolver;
            }
            Function::SetTtl => {
                let ttl = uint_arg(request, 1)?;
                records.entry(node).or_default().ttl = ttl;
            }
            other => return Err(unsupported(other, "transaction")),
        }
        Ok(())
    }

    fn resolver_write(&self, request: &CallRequest, sender: &Address) -> Result<(), GatewayError> {
        let node = node_arg(request, 0)?;
        // Lock order is always records, then resolutions.
        let records = self.records.read();
        require_owner(&records, &node, sender)?;

        let mut resolutions = self.resolutions.write();
        match request.function {
            Function::SetAddr => {
                let addr = address_arg(request, 1)?;
                resolutions.entry(node).or_default().addr = Some(addr);
            }
            Function::SetContent => {
                let content = bytes_arg(request, 1)?;
                resolutions.entry(node).or_default().content = Some(content);
            }
            other => return Err(unsupported(other, "transaction")),
        }
        Ok(())
    }

    fn receipt(&self, request: &CallRequest, sender: &Address) -> TransactionReceipt {
        let nonce = self.tx_counter.fetch_add(1, Ordering::SeqCst);
        let mut preimage = nonce.to_be_bytes().to_vec();
        preimage.extend_from_slice(sender.as_bytes());
        preimage.extend_from_slice(&request.calldata());

        TransactionReceipt {
            tx_hash: Bytes32(keccak256(&preimage)),
            sender: *sender,
            contract: request.contract,
            function: request.function,
        }
    }
}

#[async_trait]
impl LedgerGateway for InMemoryLedger {
    async fn call(&self, request: &CallRequest) -> Result<ReturnData, GatewayError> {
        self.take_failure()?;
        if request.contract == self.registry_address {
            self.registry_read(request)
        } else if request.contract == self.resolver_address {
            self.resolver_read(request)
        } else {
            Err(no_contract(&request.contract))
        }
    }

    async fn transact(
        &self,
        request: &CallRequest,
        sender: &Address,
    ) -> Result<TransactionReceipt, GatewayError> {
        self.take_failure()?;
        if request.contract == self.registry_address {
            self.registry_write(request, sender)?;
        } else if request.contract == self.resolver_address {
            self.resolver_write(request, sender)?;
        } else {
            return Err(no_contract(&request.contract));
        }
        Ok(self.receipt(request, sender))
    }
}

fn require_owner(
    records: &HashMap<NodeId, RegistryEntry>,
    node: &NodeId,
    sender: &Address,
) -> Result<(), GatewayError> {
    let owner = records
        .get(node)
        .map(|entry| entry.owner)
        .unwrap_or(Address::ZERO);
    if owner.is_zero() {
        return Err(GatewayError::Revert("node not owned".to_string()));
    }
    if owner != *sender {
        return Err(GatewayError::Revert("not owner".to_string()));
    }
    Ok(())
}

fn no_contract(address: &Address) -> GatewayError {
    GatewayError::Revert(format!("no contract at {address}"))
}

fn unsupported(function: Function, kind: &str) -> GatewayError {
    GatewayError::Revert(format!("{function} is not supported as a {kind}"))
}

fn arg(request: &CallRequest, index: usize) -> Result<Token, GatewayError> {
    request
        .args
        .get(index)
        .copied()
        .ok_or_else(|| {
            GatewayError::Revert(format!("{} missing argument {index}", request.function))
        })
}

fn node_arg(request: &CallRequest, index: usize) -> Result<NodeId, GatewayError> {
    match arg(request, index)? {
        Token::Node(node) => Ok(node),
        Token::FixedBytes(bytes) => Ok(NodeId(bytes.0)),
        _ => Err(bad_arg(request, index)),
    }
}

fn bytes_arg(request: &CallRequest, index: usize) -> Result<Bytes32, GatewayError> {
    match arg(request, index)? {
        Token::FixedBytes(bytes) => Ok(bytes),
        Token::Node(node) => Ok(Bytes32(node.0)),
        _ => Err(bad_arg(request, index)),
    }
}

fn address_arg(request: &CallRequest, index: usize) -> Result<Address, GatewayError> {
    match arg(request, index)? {
        Token::Address(address) => Ok(address),
        _ => Err(bad_arg(request, index)),
    }
}

fn uint_arg(request: &CallRequest, index: usize) -> Result<u64, GatewayError> {
    match arg(request, index)? {
        Token::Uint(value) => Ok(value),
        _ => Err(bad_arg(request, index)),
    }
}

fn bad_arg(request: &CallRequest, index: usize) -> GatewayError {
    GatewayError::Revert(format!("{} argument {index} has the wrong type", request.function))
}

#[cfg(test)]
mod tests {
    use super::*;
    use namereg_crypto::{labelhash, namehash_str};

    fn root() -> Address {
        Address([0xAA; 20])
    }

    fn set_subnode(
        ledger: &InMemoryLedger,
        parent: NodeId,
        label: &str,
        owner: Address,
    ) -> CallRequest {
        CallRequest::new(
            ledger.registry_address(),
            Function::SetSubnodeOwner,
            vec![
                Token::Node(parent),
                Token::FixedBytes(labelhash(label)),
                Token::Address(owner),
            ],
        )
    }

    #[tokio::test]
    async fn root_owner_can_create_top_level_node() {
        let ledger = InMemoryLedger::new(root());
        let request = set_subnode(&ledger, NodeId::ROOT, "eth", root());
        let receipt = ledger.transact(&request, &root()).await.unwrap();
        assert_eq!(receipt.function, Function::SetSubnodeOwner);
        assert_eq!(ledger.transaction_count(), 1);

        let eth = namehash_str("eth").unwrap();
        let owner = ledger
            .call(&CallRequest::new(
                ledger.registry_address(),
                Function::Owner,
                vec![Token::Node(eth)],
            ))
            .await
            .unwrap();
        assert_eq!(owner.as_address(), Some(root()));
    }

    #[tokio::test]
    async fn stranger_cannot_create_under_root() {
        let ledger = InMemoryLedger::new(root());
        let stranger = Address([0xBB; 20]);
        let request = set_subnode(&ledger, NodeId::ROOT, "eth", stranger);
        let err = ledger.transact(&request, &stranger).await.unwrap_err();
        assert_eq!(err, GatewayError::Revert("not owner".into()));
        assert_eq!(ledger.transaction_count(), 0);
    }

    #[tokio::test]
    async fn unknown_contract_reverts() {
        let ledger = InMemoryLedger::new(root());
        let request =
            CallRequest::new(Address::ZERO, Function::Addr, vec![Token::Node(NodeId::ROOT)]);
        let err = ledger.call(&request).await.unwrap_err();
        assert!(matches!(err, GatewayError::Revert(reason) if reason.starts_with("no contract")));
    }

    #[tokio::test]
    async fn missing_record_reverts() {
        let ledger = InMemoryLedger::new(root());
        let request = CallRequest::new(
            ledger.resolver_address(),
            Function::Content,
            vec![Token::Node(NodeId::ROOT)],
        );
        let err = ledger.call(&request).await.unwrap_err();
        assert_eq!(err, GatewayError::Revert("record not set".into()));
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let ledger = InMemoryLedger::new(root());
        ledger.fail_next(GatewayError::Timeout);
        let request = CallRequest::new(
            ledger.registry_address(),
            Function::Owner,
            vec![Token::Node(NodeId::ROOT)],
        );
        assert_eq!(ledger.call(&request).await.unwrap_err(), GatewayError::Timeout);
        assert!(ledger.call(&request).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_transfers_have_a_single_winner() {
        let ledger = Arc::new(InMemoryLedger::new(root()));
        let handles: Vec<_> = (1..=32u8)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    let request = CallRequest::new(
                        ledger.registry_address(),
                        Function::SetOwner,
                        vec![Token::Node(NodeId::ROOT), Token::Address(Address([i; 20]))],
                    );
                    ledger.transact(&request, &root()).await.is_ok()
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(ledger.transaction_count(), 1);
    }

    #[tokio::test]
    async fn write_functions_are_rejected_as_calls() {
        let ledger = InMemoryLedger::new(root());
        let request = CallRequest::new(
            ledger.registry_address(),
            Function::SetOwner,
            vec![Token::Node(NodeId::ROOT), Token::Address(root())],
        );
        assert!(matches!(
            ledger.call(&request).await.unwrap_err(),
            GatewayError::Revert(_)
        ));
    }
}
