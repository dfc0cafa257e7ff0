//! Identity resolution from das-lock arguments.
//!
//! Every account cell is locked by a das-lock script whose args carry the
//! owner and the manager of the account. This crate provides:
//! - [`chain_type`]: signing algorithm ids and the chains they map to
//! - [`address`]: parsing args into [`DasAddressHex`] pairs, the reverse
//!   packing, and per-chain address normalization
//!
//! Resolution is a pure function of the args blob.

pub mod address;
pub mod chain_type;
pub mod error;

pub use address::{
    args_to_hex, hex_to_args, normalize_address_hex, parse_payload, render_payload,
    DasAddressHex, DAS_LOCK_ARGS_LEN, PAYLOAD_LEN,
};
pub use chain_type::{ChainType, DasAlgorithmId};
pub use error::{ResolveError, ResolveResult};
