//! Name Registry Clients
//!
//! Client-side logic for a hierarchical, ledger-backed name registry: names
//! such as `1.bar.eth` are hashed into node ids, the registry contract maps
//! node ids to an owner and a resolver, and the resolver contract holds the
//! address and content records. The ledger itself sits behind
//! [`LedgerGateway`]; [`InMemoryLedger`] provides a self-contained one.

pub mod errors;
pub mod gateway;
pub mod memory;
pub mod registry;
pub mod resolution;
pub mod tree;
pub mod types;

pub use errors::*;
pub use gateway::{GatewayError, LedgerGateway};
pub use memory::InMemoryLedger;
pub use registry::RegistryClient;
pub use resolution::ResolverClient;
pub use tree::{DeletePolicy, DomainTreeManager};
pub use types::*;
