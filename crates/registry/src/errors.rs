//! Error types for the name registry clients

use crate::gateway::GatewayError;
use crate::types::Function;
use namereg_types::NameError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NameServiceError {
    /// Rejected locally; no call reached the ledger.
    #[error("Malformed name: {0}")]
    MalformedName(#[from] NameError),

    /// The ledger reverted: not owner, node unowned, resolver or record absent.
    #[error("{function} reverted: {reason}")]
    Reverted { function: Function, reason: String },

    /// Network failure or timeout talking to the ledger.
    #[error("{function} failed in transit: {detail}")]
    Transient { function: Function, detail: String },

    #[error("{function} returned undecodable data: {detail}")]
    Decode { function: Function, detail: String },
}

impl NameServiceError {
    pub(crate) fn from_gateway(function: Function, err: GatewayError) -> Self {
        match err {
            GatewayError::Revert(reason) => NameServiceError::Reverted { function, reason },
            GatewayError::Transport(detail) => NameServiceError::Transient { function, detail },
            GatewayError::Timeout => NameServiceError::Transient {
                function,
                detail: "request timed out".to_string(),
            },
        }
    }

    /// Only transport-level failures are worth retrying; a revert will revert again.
    pub fn is_retriable(&self) -> bool {
        matches!(self, NameServiceError::Transient { .. })
    }

    pub fn is_revert(&self) -> bool {
        matches!(self, NameServiceError::Reverted { .. })
    }

    /// Revert reason exactly as the ledger reported it.
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            NameServiceError::Reverted { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, NameServiceError>;
