use std::fmt;

/// A lock argument blob or address could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Lock args are not `1 + 20 + 1 + 20` bytes.
    InvalidLength { expected: usize, actual: usize },
    /// Algorithm id with no known chain type.
    UnknownAlgorithm(u8),
    /// Address string that is not a valid payload for its chain type.
    InvalidAddress { address: String, reason: String },
    /// Address chain type disagrees with its algorithm.
    ChainTypeMismatch {
        algorithm_id: u8,
        chain_type: u8,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::InvalidLength { expected, actual } => write!(
                f,
                "das-lock args must be {} bytes, got {}",
                expected, actual
            ),
            ResolveError::UnknownAlgorithm(id) => write!(f, "unknown das algorithm id {}", id),
            ResolveError::InvalidAddress { address, reason } => {
                write!(f, "invalid address '{}': {}", address, reason)
            }
            ResolveError::ChainTypeMismatch {
                algorithm_id,
                chain_type,
            } => write!(
                f,
                "algorithm {} cannot sign for chain type {}",
                algorithm_id, chain_type
            ),
        }
    }
}

impl std::error::Error for ResolveError {}

pub type ResolveResult<T> = Result<T, ResolveError>;
