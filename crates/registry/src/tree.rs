//! Subdomain lifecycle management.
//!
//! A node moves UNOWNED → OWNED on creation by the parent owner and back to
//! UNOWNED on deletion by the parent owner. Records may be changed any number
//! of times while it is owned.

use crate::errors::*;
use crate::gateway::LedgerGateway;
use crate::registry::RegistryClient;
use crate::resolution::ResolverClient;
use crate::types::TransactionReceipt;
use namereg_crypto::namehash;
use namereg_types::{Address, Label, Name, NodeId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What `delete_subdomain` leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Reset the owner only. The resolver pointer stays as it was.
    #[default]
    OwnerOnly,
    /// Reclaim the node, clear its resolver pointer, then reset the owner.
    ClearResolver,
}

/// Creates, transfers and deletes nodes in the domain tree.
pub struct DomainTreeManager<G: ?Sized> {
    registry: RegistryClient<G>,
    resolver: ResolverClient<G>,
    delete_policy: DeletePolicy,
}

impl<G: ?Sized> Clone for DomainTreeManager<G> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            resolver: self.resolver.clone(),
            delete_policy: self.delete_policy,
        }
    }
}

impl<G: LedgerGateway + ?Sized> DomainTreeManager<G> {
    pub fn new(registry: RegistryClient<G>) -> Self {
        let resolver = ResolverClient::new(registry.clone());
        Self {
            registry,
            resolver,
            delete_policy: DeletePolicy::default(),
        }
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    pub fn registry(&self) -> &RegistryClient<G> {
        &self.registry
    }

    pub fn resolver(&self) -> &ResolverClient<G> {
        &self.resolver
    }

    /// Give `label.parent` to `owner` (the sender when `None`).
    ///
    /// The sender must own `parent`; if `label.parent` already had an owner
    /// it is replaced.
    pub async fn create_subdomain(
        &self,
        label: &str,
        parent: &str,
        owner: Option<Address>,
    ) -> Result<TransactionReceipt> {
        let (label, parent_name, child) = child_of(label, parent)?;
        let owner = owner.unwrap_or_else(|| self.registry.sender());
        let parent_node = namehash(&parent_name);

        let receipt = self
            .registry
            .set_subnode_owner(parent_node, &label, owner)
            .await?;
        info!(name = %child, %owner, "subdomain created");
        Ok(receipt)
    }

    /// Return `label.parent` to the unowned state.
    ///
    /// Under [`DeletePolicy::ClearResolver`] a failure after the node was
    /// reclaimed hands it back to its previous holder before the error is
    /// returned.
    pub async fn delete_subdomain(&self, label: &str, parent: &str) -> Result<TransactionReceipt> {
        let (label, parent_name, child) = child_of(label, parent)?;
        let parent_node = namehash(&parent_name);

        let receipt = match self.delete_policy {
            DeletePolicy::OwnerOnly => self.release(parent_node, &label).await?,
            DeletePolicy::ClearResolver => {
                self.clear_and_release(parent_node, &label, &child).await?
            }
        };
        info!(name = %child, policy = ?self.delete_policy, "subdomain deleted");
        Ok(receipt)
    }

    async fn release(&self, parent: NodeId, label: &Label) -> Result<TransactionReceipt> {
        self.registry
            .set_subnode_owner(parent, label, Address::ZERO)
            .await
    }

    async fn clear_and_release(
        &self,
        parent: NodeId,
        label: &Label,
        child: &Name,
    ) -> Result<TransactionReceipt> {
        let holder = self.registry.owner(child.as_str()).await?;

        // Only the node's own owner may touch its resolver pointer.
        self.registry
            .set_subnode_owner(parent, label, self.registry.sender())
            .await?;

        let cleared = self
            .registry
            .set_resolver(child.as_str(), Address::ZERO)
            .await;
        let outcome = match cleared {
            Ok(_) => self.release(parent, label).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                match self.registry.set_subnode_owner(parent, label, holder).await {
                    Ok(_) => info!(
                        name = %child,
                        %holder,
                        "subdomain handed back after failed delete"
                    ),
                    Err(restore) => warn!(
                        name = %child,
                        %holder,
                        error = %restore,
                        "could not hand subdomain back after failed delete"
                    ),
                }
                Err(err)
            }
        }
    }

    /// Hand `name` to `new_owner`. The sender must own `name`.
    pub async fn transfer(&self, name: &str, new_owner: Address) -> Result<TransactionReceipt> {
        let receipt = self.registry.set_owner(name, new_owner).await?;
        info!(%name, %new_owner, "name transferred");
        Ok(receipt)
    }

    /// Whether `label.parent` currently has a non-zero owner.
    pub async fn subdomain_exists(&self, label: &str, parent: &str) -> Result<bool> {
        let (_, _, child) = child_of(label, parent)?;
        let owner = self.registry.owner(child.as_str()).await?;
        Ok(!owner.is_zero())
    }
}

fn child_of(label: &str, parent: &str) -> Result<(Label, Name, Name)> {
    let label = Label::parse(label)?;
    let parent = Name::parse(parent)?;
    let child = parent.child(&label);
    Ok((label, parent, child))
}
