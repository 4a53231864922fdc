//! Connect the name registry clients to a ledger node.
//!
//! ```no_run
//! use namereg_sdk::{NameService, SdkConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = SdkConfig::load(None)?;
//! let service = NameService::connect(&config)?;
//! let owner = service.registry().owner("bar.eth").await?;
//! println!("bar.eth is owned by {owner}");
//! # Ok(())
//! # }
//! ```

mod error;
mod logging;
mod rpc;
mod settings;

pub use crate::error::SdkError;
pub use crate::logging::init_logging;
pub use crate::rpc::JsonRpcGateway;
pub use crate::settings::SdkConfig;
pub use namereg_registry::{
    DeletePolicy, DomainTreeManager, GatewayError, LedgerGateway, NameServiceError,
    RegistryClient, ResolverClient,
};
pub use namereg_types::{Address, Bytes32, Label, Name, NodeId};

use std::sync::Arc;
use tracing::info;

/// Registry, resolver and subdomain clients sharing one gateway.
#[derive(Clone)]
pub struct NameService {
    tree: DomainTreeManager<dyn LedgerGateway>,
}

impl NameService {
    /// Build a JSON-RPC gateway from `config` and wire the clients to it.
    pub fn connect(config: &SdkConfig) -> Result<Self, SdkError> {
        let gateway = JsonRpcGateway::from_config(config)?;
        info!(
            endpoint = %gateway.endpoint(),
            registry = %config.registry_address,
            sender = %config.sender,
            "name service connected"
        );
        Ok(Self::with_gateway(Arc::new(gateway), config))
    }

    /// Wire the clients to any gateway, e.g. an in-memory ledger.
    pub fn with_gateway(gateway: Arc<dyn LedgerGateway>, config: &SdkConfig) -> Self {
        let registry = RegistryClient::new(gateway, config.registry_address, config.sender);
        let tree = DomainTreeManager::new(registry).with_delete_policy(config.delete_policy);
        Self { tree }
    }

    pub fn registry(&self) -> &RegistryClient<dyn LedgerGateway> {
        self.tree.registry()
    }

    pub fn resolver(&self) -> &ResolverClient<dyn LedgerGateway> {
        self.tree.resolver()
    }

    pub fn tree(&self) -> &DomainTreeManager<dyn LedgerGateway> {
        &self.tree
    }
}
