//! Projection of DAS account lifecycle transactions into relational state.
//!
//! - [`block_parser`]: action dispatch and the per-action handlers
//! - [`dao`]: the persistence boundary and an in-memory implementation
//! - [`error`]: [`ParseError`] and [`HandlerError`]
//! - [`config`]: [`IndexerConfig`] loading
//! - [`logging`]: subscriber setup for the binary
//!
//! Decoding, identity resolution and chain access live in the `das-witness`,
//! `das-resolver`, `das-transport` and `das-state-fetcher` crates.

pub mod block_parser;
pub mod config;
pub mod dao;
pub mod error;
pub mod logging;

pub use block_parser::{BlockParser, HandleOutcome, HandleRequest, ParseContext, WriteSet};
pub use config::IndexerConfig;
pub use dao::{DbDao, MemoryDao};
pub use error::{HandlerError, ParseError};
