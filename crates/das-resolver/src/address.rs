//! das-lock argument parsing and per-chain hex rendering.
//!
//! A das-lock args blob packs two identities back to back:
//! `owner_algorithm_id(1) ++ owner_payload(20) ++ manager_algorithm_id(1) ++ manager_payload(20)`.

use serde::{Deserialize, Serialize};

use crate::chain_type::{ChainType, DasAlgorithmId};
use crate::error::{ResolveError, ResolveResult};

/// Length of an address payload.
pub const PAYLOAD_LEN: usize = 20;

/// Length of a full das-lock args blob.
pub const DAS_LOCK_ARGS_LEN: usize = 2 * (1 + PAYLOAD_LEN);

/// Prefix of a Tron hex address.
const TRON_PREFIX: &str = "41";

/// One resolved identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DasAddressHex {
    pub das_algorithm_id: DasAlgorithmId,
    pub chain_type: ChainType,
    pub address_hex: String,
}

impl DasAddressHex {
    pub fn new(das_algorithm_id: DasAlgorithmId, payload: &[u8; PAYLOAD_LEN]) -> Self {
        let chain_type = das_algorithm_id.chain_type();
        Self {
            das_algorithm_id,
            chain_type,
            address_hex: render_payload(chain_type, payload),
        }
    }

    /// Raw 20-byte payload behind `address_hex`.
    pub fn payload(&self) -> ResolveResult<[u8; PAYLOAD_LEN]> {
        if self.das_algorithm_id.chain_type() != self.chain_type {
            return Err(ResolveError::ChainTypeMismatch {
                algorithm_id: self.das_algorithm_id.as_u8(),
                chain_type: self.chain_type.as_u8(),
            });
        }
        parse_payload(self.chain_type, &self.address_hex)
    }
}

/// Hex form of a payload on `chain_type`.
///
/// ```
/// use das_resolver::{render_payload, ChainType};
///
/// assert_eq!(render_payload(ChainType::Evm, &[0xab; 20]), format!("0x{}", "ab".repeat(20)));
/// assert_eq!(render_payload(ChainType::Tron, &[0xab; 20]), format!("41{}", "ab".repeat(20)));
/// ```
pub fn render_payload(chain_type: ChainType, payload: &[u8; PAYLOAD_LEN]) -> String {
    match chain_type {
        ChainType::Tron => format!("{}{}", TRON_PREFIX, hex::encode(payload)),
        _ => format!("0x{}", hex::encode(payload)),
    }
}

/// Parse a hex address for `chain_type`, accepting either case and an optional `0x`.
pub fn parse_payload(chain_type: ChainType, address: &str) -> ResolveResult<[u8; PAYLOAD_LEN]> {
    let invalid = |reason: String| ResolveError::InvalidAddress {
        address: address.to_string(),
        reason,
    };

    let trimmed = address.trim();
    let mut digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if chain_type == ChainType::Tron {
        digits = digits
            .strip_prefix(TRON_PREFIX)
            .ok_or_else(|| invalid(format!("tron address must start with {}", TRON_PREFIX)))?;
    }
    if digits.len() != PAYLOAD_LEN * 2 {
        return Err(invalid(format!(
            "expected {} hex digits, got {}",
            PAYLOAD_LEN * 2,
            digits.len()
        )));
    }

    let mut payload = [0u8; PAYLOAD_LEN];
    hex::decode_to_slice(digits, &mut payload).map_err(|e| invalid(e.to_string()))?;
    Ok(payload)
}

/// Canonical hex form of an address on `chain_type`.
pub fn normalize_address_hex(chain_type: ChainType, address: &str) -> ResolveResult<String> {
    parse_payload(chain_type, address).map(|payload| render_payload(chain_type, &payload))
}

fn read_identity(args: &[u8]) -> ResolveResult<DasAddressHex> {
    let algorithm = DasAlgorithmId::try_from(args[0])?;
    let mut payload = [0u8; PAYLOAD_LEN];
    payload.copy_from_slice(&args[1..1 + PAYLOAD_LEN]);
    Ok(DasAddressHex::new(algorithm, &payload))
}

/// Resolve the owner and manager identities packed in das-lock args.
///
/// Both identities come from the same blob in one call, so they are never
/// resolved from different versions of the args.
pub fn args_to_hex(args: &[u8]) -> ResolveResult<(DasAddressHex, DasAddressHex)> {
    if args.len() != DAS_LOCK_ARGS_LEN {
        return Err(ResolveError::InvalidLength {
            expected: DAS_LOCK_ARGS_LEN,
            actual: args.len(),
        });
    }
    let (owner, manager) = args.split_at(DAS_LOCK_ARGS_LEN / 2);
    Ok((read_identity(owner)?, read_identity(manager)?))
}

/// Pack owner and manager identities back into das-lock args.
pub fn hex_to_args(owner: &DasAddressHex, manager: &DasAddressHex) -> ResolveResult<Vec<u8>> {
    let mut args = Vec::with_capacity(DAS_LOCK_ARGS_LEN);
    for identity in [owner, manager] {
        args.push(identity.das_algorithm_id.as_u8());
        args.extend_from_slice(&identity.payload()?);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(owner_algorithm: u8, owner: u8, manager_algorithm: u8, manager: u8) -> Vec<u8> {
        let mut out = vec![owner_algorithm];
        out.extend_from_slice(&[owner; 20]);
        out.push(manager_algorithm);
        out.extend_from_slice(&[manager; 20]);
        out
    }

    #[test]
    fn test_args_to_hex_owner_and_manager() {
        let (owner, manager) = args_to_hex(&args(3, 0x11, 4, 0xab)).unwrap();
        assert_eq!(owner.das_algorithm_id, DasAlgorithmId::Eth);
        assert_eq!(owner.chain_type, ChainType::Evm);
        assert_eq!(owner.address_hex, format!("0x{}", "11".repeat(20)));
        assert_eq!(manager.chain_type, ChainType::Tron);
        assert_eq!(manager.address_hex, format!("41{}", "ab".repeat(20)));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let blob = args(5, 0x22, 6, 0x33);
        assert_eq!(args_to_hex(&blob).unwrap(), args_to_hex(&blob).unwrap());
        let (owner, manager) = args_to_hex(&blob).unwrap();
        assert_eq!(owner.chain_type, ChainType::Evm);
        assert_eq!(manager.chain_type, ChainType::Mixin);
    }

    #[test]
    fn test_args_to_hex_rejects_bad_blobs() {
        assert_eq!(
            args_to_hex(&[0u8; 41]),
            Err(ResolveError::InvalidLength {
                expected: 42,
                actual: 41
            })
        );
        assert_eq!(
            args_to_hex(&args(3, 0, 2, 0)),
            Err(ResolveError::UnknownAlgorithm(2))
        );
    }

    #[test]
    fn test_hex_to_args_inverts_resolution() {
        let blob = args(0, 0x01, 7, 0xfe);
        let (owner, manager) = args_to_hex(&blob).unwrap();
        assert_eq!(hex_to_args(&owner, &manager).unwrap(), blob);

        let upper = DasAddressHex {
            das_algorithm_id: DasAlgorithmId::Eth,
            chain_type: ChainType::Evm,
            address_hex: format!("0X{}", "AB".repeat(20)),
        };
        let packed = hex_to_args(&upper, &upper).unwrap();
        assert_eq!(&packed[1..21], &[0xab; 20]);
    }

    #[test]
    fn test_hex_to_args_rejects_mismatched_chain() {
        let wrong = DasAddressHex {
            das_algorithm_id: DasAlgorithmId::Tron,
            chain_type: ChainType::Evm,
            address_hex: format!("0x{}", "ab".repeat(20)),
        };
        assert!(matches!(
            hex_to_args(&wrong, &wrong),
            Err(ResolveError::ChainTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_normalize_address_hex() {
        let evm = "AB".repeat(20);
        assert_eq!(
            normalize_address_hex(ChainType::Evm, &evm).unwrap(),
            format!("0x{}", "ab".repeat(20))
        );
        let tron = format!("0x41{}", "CD".repeat(20));
        assert_eq!(
            normalize_address_hex(ChainType::Tron, &tron).unwrap(),
            format!("41{}", "cd".repeat(20))
        );
        assert!(normalize_address_hex(ChainType::Tron, &"cd".repeat(20)).is_err());
        assert!(normalize_address_hex(ChainType::Evm, "0x1234").is_err());
        assert!(normalize_address_hex(ChainType::Ckb, &"zz".repeat(20)).is_err());
    }
}
