//! Signing algorithms and the chains they belong to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, ResolveResult};

/// Signing algorithm id stored in das-lock args.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum DasAlgorithmId {
    Ckb,
    Eth,
    Tron,
    Eth712,
    Ed25519,
    DogeCoin,
}

impl DasAlgorithmId {
    pub fn as_u8(self) -> u8 {
        match self {
            DasAlgorithmId::Ckb => 0,
            DasAlgorithmId::Eth => 3,
            DasAlgorithmId::Tron => 4,
            DasAlgorithmId::Eth712 => 5,
            DasAlgorithmId::Ed25519 => 6,
            DasAlgorithmId::DogeCoin => 7,
        }
    }

    pub fn chain_type(self) -> ChainType {
        match self {
            DasAlgorithmId::Ckb => ChainType::Ckb,
            DasAlgorithmId::Eth | DasAlgorithmId::Eth712 => ChainType::Evm,
            DasAlgorithmId::Tron => ChainType::Tron,
            DasAlgorithmId::Ed25519 => ChainType::Mixin,
            DasAlgorithmId::DogeCoin => ChainType::Doge,
        }
    }
}

impl TryFrom<u8> for DasAlgorithmId {
    type Error = ResolveError;

    fn try_from(id: u8) -> ResolveResult<Self> {
        match id {
            0 => Ok(DasAlgorithmId::Ckb),
            3 => Ok(DasAlgorithmId::Eth),
            4 => Ok(DasAlgorithmId::Tron),
            5 => Ok(DasAlgorithmId::Eth712),
            6 => Ok(DasAlgorithmId::Ed25519),
            7 => Ok(DasAlgorithmId::DogeCoin),
            other => Err(ResolveError::UnknownAlgorithm(other)),
        }
    }
}

impl From<DasAlgorithmId> for u8 {
    fn from(id: DasAlgorithmId) -> u8 {
        id.as_u8()
    }
}

/// Chain an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ChainType {
    Ckb,
    Evm,
    Tron,
    Mixin,
    Doge,
}

impl ChainType {
    pub fn as_u8(self) -> u8 {
        match self {
            ChainType::Ckb => 0,
            ChainType::Evm => 1,
            ChainType::Tron => 3,
            ChainType::Mixin => 4,
            ChainType::Doge => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChainType::Ckb => "ckb",
            ChainType::Evm => "evm",
            ChainType::Tron => "tron",
            ChainType::Mixin => "mixin",
            ChainType::Doge => "doge",
        }
    }
}

impl TryFrom<u8> for ChainType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, String> {
        match code {
            0 => Ok(ChainType::Ckb),
            1 => Ok(ChainType::Evm),
            3 => Ok(ChainType::Tron),
            4 => Ok(ChainType::Mixin),
            7 => Ok(ChainType::Doge),
            other => Err(format!("unknown chain type {}", other)),
        }
    }
}

impl From<ChainType> for u8 {
    fn from(chain: ChainType) -> u8 {
        chain.as_u8()
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.as_u8())
    }
}
