use thiserror::Error;

/// Failure taxonomy shared by the math, cache, index and quoting layers.
///
/// Pure math fails fast with one of these. Caches and indexes mostly swallow
/// them into fallbacks and only log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("remote call failed: {0}")]
    RemoteFailure(String),

    #[error("overflow: {0}")]
    Overflow(String),
}

impl CoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        CoreError::InvalidInput(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        CoreError::RemoteFailure(msg.into())
    }
}

impl From<ethers::providers::ProviderError> for CoreError {
    fn from(e: ethers::providers::ProviderError) -> Self {
        CoreError::RemoteFailure(e.to_string())
    }
}

impl From<ethers::abi::Error> for CoreError {
    fn from(e: ethers::abi::Error) -> Self {
        CoreError::RemoteFailure(format!("abi: {}", e))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
