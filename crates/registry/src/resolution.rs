//! Resolution records: name → resolver → {addr, content}.

use crate::errors::*;
use crate::gateway::LedgerGateway;
use crate::registry::{hash_name, submit, RegistryClient};
use crate::types::*;
use namereg_types::{Address, Bytes32, NodeId};
use tracing::debug;

/// Client for resolver contracts, reached through the registry.
///
/// Every operation first looks up the resolver configured for the name. A
/// zero resolver is not special-cased: the request goes to the zero address
/// and whatever the ledger answers (normally a revert) is returned. Missing
/// resolvers and missing records therefore surface as the same error class.
pub struct ResolverClient<G: ?Sized> {
    registry: RegistryClient<G>,
}

impl<G: ?Sized> Clone for ResolverClient<G> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<G: LedgerGateway + ?Sized> ResolverClient<G> {
    pub fn new(registry: RegistryClient<G>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RegistryClient<G> {
        &self.registry
    }

    /// Address record for `name`. Fails if no resolver or no record is set.
    pub async fn addr(&self, name: &str) -> Result<Address> {
        let data = self.read(name, Function::Addr).await?;
        data.as_address().ok_or_else(|| NameServiceError::Decode {
            function: Function::Addr,
            detail: format!("expected an address word, got {} bytes", data.0.len()),
        })
    }

    pub async fn set_addr(&self, name: &str, addr: Address) -> Result<TransactionReceipt> {
        self.write(name, Function::SetAddr, Token::Address(addr)).await
    }

    /// Content hash for `name`. Fails if no resolver or no record is set.
    pub async fn content(&self, name: &str) -> Result<Bytes32> {
        let data = self.read(name, Function::Content).await?;
        data.as_bytes32().ok_or_else(|| NameServiceError::Decode {
            function: Function::Content,
            detail: format!("expected a 32-byte word, got {} bytes", data.0.len()),
        })
    }

    pub async fn set_content(&self, name: &str, hash: Bytes32) -> Result<TransactionReceipt> {
        self.write(name, Function::SetContent, Token::FixedBytes(hash))
            .await
    }

    async fn locate(&self, name: &str) -> Result<(NodeId, Address)> {
        let node = hash_name(name)?;
        let resolver = self.registry.resolver(name).await?;
        debug!(%name, %node, %resolver, "located resolver");
        Ok((node, resolver))
    }

    async fn read(&self, name: &str, function: Function) -> Result<ReturnData> {
        let (node, resolver) = self.locate(name).await?;
        let request = CallRequest::new(resolver, function, vec![Token::Node(node)]);
        debug!(%function, %node, %resolver, "resolver call");
        self.registry
            .gateway()
            .call(&request)
            .await
            .map_err(|err| NameServiceError::from_gateway(function, err))
    }

    async fn write(
        &self,
        name: &str,
        function: Function,
        value: Token,
    ) -> Result<TransactionReceipt> {
        let (node, resolver) = self.locate(name).await?;
        let request = CallRequest::new(resolver, function, vec![Token::Node(node), value]);
        submit(
            self.registry.gateway().as_ref(),
            &request,
            &self.registry.sender(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedger;
    use namereg_types::Label;
    use std::sync::Arc;

    fn owner() -> Address {
        Address([0xAA; 20])
    }

    async fn setup() -> (Arc<InMemoryLedger>, ResolverClient<InMemoryLedger>) {
        let ledger = Arc::new(InMemoryLedger::new(owner()));
        let registry = RegistryClient::new(ledger.clone(), ledger.registry_address(), owner());
        let eth = namereg_crypto::namehash_str("eth").unwrap();
        for (label, parent) in [("eth", NodeId::ROOT), ("bar", eth)] {
            registry
                .set_subnode_owner(parent, &Label::parse(label).unwrap(), owner())
                .await
                .unwrap();
        }
        (ledger, ResolverClient::new(registry))
    }

    #[tokio::test]
    async fn addr_is_left_padded() {
        let (ledger, resolver) = setup().await;
        resolver
            .registry()
            .set_resolver("bar.eth", ledger.resolver_address())
            .await
            .unwrap();

        let short: Address = "0x12345".parse().unwrap();
        resolver.set_addr("bar.eth", short).await.unwrap();
        assert_eq!(
            resolver.addr("bar.eth").await.unwrap().to_string(),
            "0x0000000000000000000000000000000000012345"
        );
    }

    #[tokio::test]
    async fn missing_resolver_and_missing_record_are_both_reverts() {
        let (ledger, resolver) = setup().await;

        let no_resolver = resolver.addr("bar.eth").await.unwrap_err();
        assert!(no_resolver.is_revert());

        resolver
            .registry()
            .set_resolver("bar.eth", ledger.resolver_address())
            .await
            .unwrap();
        let no_record = resolver.content("bar.eth").await.unwrap_err();
        assert!(no_record.is_revert());
    }

    #[tokio::test]
    async fn content_round_trip() {
        let (ledger, resolver) = setup().await;
        resolver
            .registry()
            .set_resolver("bar.eth", ledger.resolver_address())
            .await
            .unwrap();
        let hash = Bytes32([0x5a; 32]);
        resolver.set_content("bar.eth", hash).await.unwrap();
        assert_eq!(resolver.content("bar.eth").await.unwrap(), hash);
    }

    #[tokio::test]
    async fn set_addr_without_resolver_fails() {
        let (_, resolver) = setup().await;
        let err = resolver
            .set_addr("bar.eth", Address([1; 20]))
            .await
            .unwrap_err();
        assert!(err.revert_reason().unwrap().starts_with("no contract"));
    }
}
