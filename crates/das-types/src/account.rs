//! Account identity: id derivation and lifecycle status.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoding::bytes_to_hex;

/// Suffix appended to the decoded account characters to form the full name.
pub const ACCOUNT_SUFFIX: &str = ".bit";

const CKB_HASH_PERSONALIZATION: &[u8] = b"ckb-default-hash";

/// 20-byte account id: the leading bytes of the chain hash of the account name.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex, the form stored in every table.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_hex())
    }
}

/// Derive the account id from a full account name (e.g. `"alice.bit"`).
///
/// blake2b-256 with the chain's default personalization, truncated to 20 bytes.
pub fn account_id_from_name(account: &str) -> AccountId {
    let hash = blake2b_simd::Params::new()
        .hash_length(32)
        .personal(CKB_HASH_PERSONALIZATION)
        .hash(account.as_bytes());
    let mut id = [0u8; 20];
    id.copy_from_slice(&hash.as_bytes()[..20]);
    AccountId(id)
}

/// Account cell status code.
///
/// The protocol defines the numeric meaning; values the indexer does not know
/// are carried through unchanged.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountStatus(pub u8);

impl AccountStatus {
    pub const NORMAL: AccountStatus = AccountStatus(0);
    pub const ON_SALE: AccountStatus = AccountStatus(1);
    pub const ON_AUCTION: AccountStatus = AccountStatus(2);
    pub const ON_CROSS: AccountStatus = AccountStatus(3);

    pub fn name(&self) -> Option<&'static str> {
        match *self {
            Self::NORMAL => Some("normal"),
            Self::ON_SALE => Some("on_sale"),
            Self::ON_AUCTION => Some("on_auction"),
            Self::ON_CROSS => Some("on_cross"),
            _ => None,
        }
    }
}

impl From<u8> for AccountStatus {
    fn from(code: u8) -> Self {
        AccountStatus(code)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", name, self.0),
            None => write!(f, "unknown({})", self.0),
        }
    }
}

impl fmt::Debug for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
