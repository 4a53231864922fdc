use crate::types::{CallRequest, ReturnData, TransactionReceipt};
use async_trait::async_trait;
use namereg_types::Address;
use thiserror::Error;

/// Errors surfaced by a ledger backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Execution reverted; the string is the ledger's reason, untouched.
    #[error("execution reverted: {0}")]
    Revert(String),
    #[error("ledger transport error: {0}")]
    Transport(String),
    #[error("ledger request timed out")]
    Timeout,
}

/// Executes calls and transactions against the registry and resolver contracts.
///
/// A successful `transact` means the new state is visible to every later
/// `call`; implementations that talk to a real node wait for the receipt.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Read-only call. Safe to abandon before it completes.
    async fn call(&self, request: &CallRequest) -> Result<ReturnData, GatewayError>;

    /// State-changing call sent as `sender`. Once submitted it cannot be recalled.
    async fn transact(
        &self,
        request: &CallRequest,
        sender: &Address,
    ) -> Result<TransactionReceipt, GatewayError>;
}
