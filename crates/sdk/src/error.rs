use thiserror::Error;

/// Errors raised while building a connection to a ledger node.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid RPC endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
