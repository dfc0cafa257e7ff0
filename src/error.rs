//! Error taxonomy of the projection layer.

use std::fmt;

use das_resolver::ResolveError;
use das_state_fetcher::{LookupError, RegistryError};
use das_types::H256;
use das_witness::DecodeError;

/// Why a transaction could not be projected.
#[derive(Debug)]
pub enum ParseError {
    /// A contract the handler needs is not registered.
    Contract(RegistryError),
    /// Witness or cell data is malformed.
    Decode(DecodeError),
    /// Lock args do not resolve to known identities.
    Resolve(ResolveError),
    /// Historical lookup failed.
    Lookup(LookupError),
    /// The storage write failed; nothing was applied.
    Persist(anyhow::Error),
    /// No account cell at the index the action requires.
    BuilderNotFound { index: u32 },
}

impl ParseError {
    /// Whether re-delivering the same transaction may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ParseError::Lookup(e) => e.is_retryable(),
            ParseError::Persist(_) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Contract(e) => write!(f, "contract registry: {}", e),
            ParseError::Decode(e) => write!(f, "decode: {}", e),
            ParseError::Resolve(e) => write!(f, "resolve: {}", e),
            ParseError::Lookup(e) => write!(f, "lookup: {}", e),
            ParseError::Persist(e) => write!(f, "persist: {:#}", e),
            ParseError::BuilderNotFound { index } => {
                write!(f, "builder is nil: no account cell at index {}", index)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Contract(e) => Some(e),
            ParseError::Decode(e) => Some(e),
            ParseError::Resolve(e) => Some(e),
            ParseError::Lookup(e) => Some(e),
            ParseError::Persist(e) => Some(&**e),
            ParseError::BuilderNotFound { .. } => None,
        }
    }
}

impl From<RegistryError> for ParseError {
    fn from(e: RegistryError) -> Self {
        ParseError::Contract(e)
    }
}

impl From<DecodeError> for ParseError {
    fn from(e: DecodeError) -> Self {
        ParseError::Decode(e)
    }
}

impl From<ResolveError> for ParseError {
    fn from(e: ResolveError) -> Self {
        ParseError::Resolve(e)
    }
}

impl From<LookupError> for ParseError {
    fn from(e: LookupError) -> Self {
        ParseError::Lookup(e)
    }
}

/// A handler failure with the transaction it happened on.
#[derive(Debug)]
pub struct HandlerError {
    pub handler: &'static str,
    pub tx_hash: H256,
    pub block_number: u64,
    pub source: ParseError,
}

impl HandlerError {
    pub fn is_retryable(&self) -> bool {
        self.source.is_retryable()
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed for tx {} at block {}: {}",
            self.handler, self.tx_hash, self.block_number, self.source
        )
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
