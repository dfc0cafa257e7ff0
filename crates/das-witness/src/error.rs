//! Decode errors for witness payloads.

use std::fmt;

/// A witness payload could not be decoded.
///
/// Decode errors are fatal for the transaction: its bytes will not change on retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Slice shorter than the structure requires.
    TooShort {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Fixed-width field with the wrong length.
    WidthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Declared total size differs from the slice length.
    TotalSizeMismatch {
        what: &'static str,
        declared: usize,
        actual: usize,
    },
    /// Offset table is not aligned, not monotonic, or out of bounds.
    InvalidOffsets { what: &'static str },
    /// Table has fewer fields than the schema requires.
    FieldCountMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Entity version this decoder does not understand.
    UnsupportedVersion { what: &'static str, version: u32 },
    /// Byte string that must be UTF-8 is not.
    InvalidUtf8 { what: &'static str },
    /// Witness id disagrees with the id derived from the decoded account name.
    AccountIdMismatch {
        account: String,
        witness_id: String,
        derived_id: String,
    },
    /// No witness or entry matching the request.
    NotFound(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::TooShort {
                what,
                expected,
                actual,
            } => write!(
                f,
                "{} too short: need at least {} bytes, got {}",
                what, expected, actual
            ),
            DecodeError::WidthMismatch {
                what,
                expected,
                actual,
            } => write!(f, "{} must be {} bytes, got {}", what, expected, actual),
            DecodeError::TotalSizeMismatch {
                what,
                declared,
                actual,
            } => write!(
                f,
                "{} declares {} bytes but slice has {}",
                what, declared, actual
            ),
            DecodeError::InvalidOffsets { what } => write!(f, "{} has an invalid offset table", what),
            DecodeError::FieldCountMismatch {
                what,
                expected,
                actual,
            } => write!(
                f,
                "{} needs {} fields, found {}",
                what, expected, actual
            ),
            DecodeError::UnsupportedVersion { what, version } => {
                write!(f, "{} version {} is not supported", what, version)
            }
            DecodeError::InvalidUtf8 { what } => write!(f, "{} is not valid UTF-8", what),
            DecodeError::AccountIdMismatch {
                account,
                witness_id,
                derived_id,
            } => write!(
                f,
                "account id mismatch for {}: witness has {}, name hashes to {}",
                account, witness_id, derived_id
            ),
            DecodeError::NotFound(what) => write!(f, "{} not found", what),
        }
    }
}

impl std::error::Error for DecodeError {}

pub type DecodeResult<T> = Result<T, DecodeError>;
