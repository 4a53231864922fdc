//! Registry client
//!
//! Reads and writes the node → {owner, resolver, ttl} mapping held by the
//! registry contract. Names are validated and hashed locally; malformed names
//! never reach the ledger.

use crate::errors::*;
use crate::gateway::LedgerGateway;
use crate::types::*;
use namereg_crypto::{labelhash, namehash};
use namereg_types::{Address, Label, Name, NodeId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Client for the registry contract.
///
/// Absent owners and resolvers come back as the zero address rather than an
/// error; absence is an ordinary answer for these lookups.
pub struct RegistryClient<G: ?Sized> {
    gateway: Arc<G>,
    registry: Address,
    sender: Address,
}

impl<G: ?Sized> Clone for RegistryClient<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            registry: self.registry,
            sender: self.sender,
        }
    }
}

impl<G: LedgerGateway + ?Sized> RegistryClient<G> {
    /// Create a client for the registry at `registry`, sending writes as `sender`.
    pub fn new(gateway: Arc<G>, registry: Address, sender: Address) -> Self {
        Self {
            gateway,
            registry,
            sender,
        }
    }

    pub fn registry_address(&self) -> Address {
        self.registry
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Same client, sending writes as a different identity.
    pub fn with_sender(&self, sender: Address) -> Self {
        Self {
            sender,
            ..self.clone()
        }
    }

    pub(crate) fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Owner of `name`, or the zero address if unowned.
    pub async fn owner(&self, name: &str) -> Result<Address> {
        let node = hash_name(name)?;
        self.read_address(Function::Owner, node).await
    }

    /// Resolver configured for `name`, or the zero address if none.
    pub async fn resolver(&self, name: &str) -> Result<Address> {
        let node = hash_name(name)?;
        self.read_address(Function::Resolver, node).await
    }

    /// Caching hint in seconds recorded for `name`.
    pub async fn ttl(&self, name: &str) -> Result<u64> {
        let node = hash_name(name)?;
        let data = self.read(Function::Ttl, node).await?;
        data.as_u64().ok_or_else(|| NameServiceError::Decode {
            function: Function::Ttl,
            detail: format!("expected a uint64 word, got {} bytes", data.0.len()),
        })
    }

    /// Point `name` at a resolver contract. Only the current owner may do this.
    pub async fn set_resolver(&self, name: &str, resolver: Address) -> Result<TransactionReceipt> {
        let node = hash_name(name)?;
        self.write(
            Function::SetResolver,
            vec![Token::Node(node), Token::Address(resolver)],
        )
        .await
    }

    /// Transfer ownership of `name` itself. Only the current owner may do this.
    pub async fn set_owner(&self, name: &str, owner: Address) -> Result<TransactionReceipt> {
        let node = hash_name(name)?;
        self.write(Function::SetOwner, vec![Token::Node(node), Token::Address(owner)])
            .await
    }

    pub async fn set_ttl(&self, name: &str, ttl: u64) -> Result<TransactionReceipt> {
        let node = hash_name(name)?;
        self.write(Function::SetTtl, vec![Token::Node(node), Token::Uint(ttl)])
            .await
    }

    /// Assign the owner of `label.<parent>` in a single transaction sent by
    /// the owner of `parent`.
    pub async fn set_subnode_owner(
        &self,
        parent: NodeId,
        label: &Label,
        owner: Address,
    ) -> Result<TransactionReceipt> {
        self.write(
            Function::SetSubnodeOwner,
            vec![
                Token::Node(parent),
                Token::FixedBytes(labelhash(label.as_str())),
                Token::Address(owner),
            ],
        )
        .await
    }

    async fn read(&self, function: Function, node: NodeId) -> Result<ReturnData> {
        let request = CallRequest::new(self.registry, function, vec![Token::Node(node)]);
        debug!(%function, %node, registry = %self.registry, "registry call");
        self.gateway
            .call(&request)
            .await
            .map_err(|err| NameServiceError::from_gateway(function, err))
    }

    async fn read_address(&self, function: Function, node: NodeId) -> Result<Address> {
        let data = self.read(function, node).await?;
        data.as_address().ok_or_else(|| NameServiceError::Decode {
            function,
            detail: format!("expected an address word, got {} bytes", data.0.len()),
        })
    }

    async fn write(&self, function: Function, args: Vec<Token>) -> Result<TransactionReceipt> {
        let request = CallRequest::new(self.registry, function, args);
        submit(self.gateway.as_ref(), &request, &self.sender).await
    }
}

/// Validate and hash a raw name.
pub(crate) fn hash_name(name: &str) -> Result<NodeId> {
    let name = Name::parse(name)?;
    Ok(namehash(&name))
}

/// Submit a transaction and log the outcome.
pub(crate) async fn submit<G: LedgerGateway + ?Sized>(
    gateway: &G,
    request: &CallRequest,
    sender: &Address,
) -> Result<TransactionReceipt> {
    let function = request.function;
    match gateway.transact(request, sender).await {
        Ok(receipt) => {
            info!(
                %function,
                contract = %request.contract,
                sender = %sender,
                tx = %receipt.tx_hash,
                "transaction applied"
            );
            Ok(receipt)
        }
        Err(err) => {
            warn!(
                %function,
                contract = %request.contract,
                sender = %sender,
                error = %err,
                "transaction failed"
            );
            Err(NameServiceError::from_gateway(function, err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedger;
    use namereg_crypto::namehash_str;

    fn root_owner() -> Address {
        Address([0xAA; 20])
    }

    fn client() -> (Arc<InMemoryLedger>, RegistryClient<InMemoryLedger>) {
        let ledger = Arc::new(InMemoryLedger::new(root_owner()));
        let client = RegistryClient::new(ledger.clone(), ledger.registry_address(), root_owner());
        (ledger, client)
    }

    #[tokio::test]
    async fn unregistered_name_has_zero_owner() {
        let (_, registry) = client();
        assert_eq!(registry.owner("nobody.eth").await.unwrap(), Address::ZERO);
        assert_eq!(registry.resolver("nobody.eth").await.unwrap(), Address::ZERO);
    }

    #[tokio::test]
    async fn root_is_owned_by_deployer() {
        let (_, registry) = client();
        assert_eq!(registry.owner("").await.unwrap(), root_owner());
    }

    #[tokio::test]
    async fn set_resolver_is_idempotent() {
        let (ledger, registry) = client();
        let eth = Label::parse("eth").unwrap();
        registry
            .set_subnode_owner(NodeId::ROOT, &eth, root_owner())
            .await
            .unwrap();

        let resolver = ledger.resolver_address();
        registry.set_resolver("eth", resolver).await.unwrap();
        registry.set_resolver("eth", resolver).await.unwrap();
        assert_eq!(registry.resolver("eth").await.unwrap(), resolver);
    }

    #[tokio::test]
    async fn set_resolver_by_non_owner_reverts() {
        let (_, registry) = client();
        let stranger = registry.with_sender(Address([0xBB; 20]));
        let err = stranger
            .set_resolver("", Address([0x22; 20]))
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some("not owner"));
    }

    #[tokio::test]
    async fn set_resolver_on_unowned_name_reverts() {
        let (ledger, registry) = client();
        let err = registry
            .set_resolver("nobody.eth", ledger.resolver_address())
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some("node not owned"));
        assert_eq!(ledger.transaction_count(), 0);
    }

    #[tokio::test]
    async fn malformed_name_never_reaches_ledger() {
        let (ledger, registry) = client();
        ledger.fail_next(crate::gateway::GatewayError::Timeout);
        let err = registry.owner("a..b").await.unwrap_err();
        assert!(matches!(err, NameServiceError::MalformedName(_)));
        // The injected failure is still pending, so no request was issued.
        assert!(registry.owner("").await.unwrap_err().is_retriable());
    }

    #[tokio::test]
    async fn ttl_round_trip_and_owner_transfer() {
        let (_, registry) = client();
        registry.set_ttl("", 3600).await.unwrap();
        assert_eq!(registry.ttl("").await.unwrap(), 3600);

        let next = Address([0xCC; 20]);
        registry.set_owner("", next).await.unwrap();
        assert_eq!(registry.owner("").await.unwrap(), next);
        assert!(registry.set_ttl("", 1).await.unwrap_err().is_revert());
    }

    #[tokio::test]
    async fn subnode_owner_lands_on_derived_node() {
        let (ledger, registry) = client();
        let eth = Label::parse("eth").unwrap();
        let holder = Address([0x01; 20]);
        registry
            .set_subnode_owner(NodeId::ROOT, &eth, holder)
            .await
            .unwrap();

        let request = CallRequest::new(
            ledger.registry_address(),
            Function::Owner,
            vec![Token::Node(namehash_str("eth").unwrap())],
        );
        let data = ledger.call(&request).await.unwrap();
        assert_eq!(data.as_address(), Some(holder));
    }
}
