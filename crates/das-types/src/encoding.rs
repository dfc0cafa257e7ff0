//! Encoding utilities for hex strings and outpoint references.

use anyhow::{anyhow, Result};

use crate::chain::H256;

/// Encode bytes as lowercase hex with a `0x` prefix.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode a hex string, with or without the `0x` prefix.
pub fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>> {
    let trimmed = hex_str.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| anyhow!("Invalid hex '{}': {}", hex_str, e))
}

/// Render an outpoint as `<tx_hash>-<index>`.
///
/// This string is the idempotency key of every persisted row.
pub fn outpoint_to_string(tx_hash: &H256, index: u32) -> String {
    format!("{}-{}", tx_hash, index)
}

/// Parse a `<tx_hash>-<index>` string back into its parts.
pub fn parse_outpoint_string(outpoint: &str) -> Result<(H256, u32)> {
    let (hash, index) = outpoint
        .rsplit_once('-')
        .ok_or_else(|| anyhow!("Invalid outpoint '{}': missing '-'", outpoint))?;
    let hash: H256 = hash.parse()?;
    let index = index
        .parse::<u32>()
        .map_err(|e| anyhow!("Invalid outpoint index in '{}': {}", outpoint, e))?;
    Ok((hash, index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        assert_eq!(bytes_to_hex(&[0xab, 0x01]), "0xab01");
        assert_eq!(hex_to_bytes("0xAB01").unwrap(), vec![0xab, 0x01]);
        assert_eq!(hex_to_bytes("ab01").unwrap(), vec![0xab, 0x01]);
        assert!(hex_to_bytes("0xzz").is_err());
    }

    #[test]
    fn test_outpoint_string() {
        let hash = H256([0x11; 32]);
        let outpoint = outpoint_to_string(&hash, 3);
        assert_eq!(outpoint, format!("0x{}-3", "11".repeat(32)));

        let (parsed, index) = parse_outpoint_string(&outpoint).unwrap();
        assert_eq!(parsed, hash);
        assert_eq!(index, 3);

        assert!(parse_outpoint_string("0x11").is_err());
    }
}
