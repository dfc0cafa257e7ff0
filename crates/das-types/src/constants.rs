//! Action and contract names recognized by the indexer.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Action names carried in a transaction's action witness.
pub struct DasAction;

impl DasAction {
    pub const EDIT_RECORDS: &'static str = "edit_records";
    pub const EDIT_MANAGER: &'static str = "edit_manager";
    pub const RENEW_ACCOUNT: &'static str = "renew_account";
    pub const TRANSFER_ACCOUNT: &'static str = "transfer_account";
    pub const FORCE_RECOVER_ACCOUNT_STATUS: &'static str = "force_recover_account_status";
    pub const RECYCLE_EXPIRED_ACCOUNT: &'static str = "recycle_expired_account";
    pub const LOCK_ACCOUNT_FOR_CROSS_CHAIN: &'static str = "lock_account_for_cross_chain";
    pub const UNLOCK_ACCOUNT_FOR_CROSS_CHAIN: &'static str = "unlock_account_for_cross_chain";
}

/// Service type recorded on transaction rows produced by account lifecycle actions.
pub const SERVICE_TYPE_REGISTER: u8 = 1;

/// Contracts whose type id the indexer checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DasContractName {
    AccountCellType,
    IncomeCellType,
    ConfigCellType,
    DasLock,
}

impl DasContractName {
    pub const ALL: [DasContractName; 4] = [
        DasContractName::AccountCellType,
        DasContractName::IncomeCellType,
        DasContractName::ConfigCellType,
        DasContractName::DasLock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DasContractName::AccountCellType => "account-cell-type",
            DasContractName::IncomeCellType => "income-cell-type",
            DasContractName::ConfigCellType => "config-cell-type",
            DasContractName::DasLock => "das-lock",
        }
    }
}

impl fmt::Display for DasContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DasContractName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        DasContractName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| anyhow!("Unknown contract name '{}'", s))
    }
}
