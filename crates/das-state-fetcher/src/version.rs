//! Version guard: does a transaction touch the current version of a contract?

use das_types::{DasContractName, Transaction};

use crate::registry::{ContractRegistry, RegistryError};

/// `true` if some output's type script is the registered version of `contract`.
///
/// `Ok(false)` means the transaction was built against another contract version
/// and should be skipped, not failed.
pub fn is_current_version_tx(
    tx: &Transaction,
    registry: &ContractRegistry,
    contract: DasContractName,
) -> Result<bool, RegistryError> {
    let info = registry.get_das_contract_info(contract)?;
    Ok(tx
        .outputs
        .iter()
        .filter_map(|output| output.type_.as_ref())
        .any(|script| info.is_same_type_id(&script.code_hash)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use das_types::{CellOutput, Script, H256};

    fn output_with_type(code_hash: Option<H256>) -> CellOutput {
        CellOutput {
            capacity: 100,
            lock: Script::default(),
            type_: code_hash.map(|code_hash| Script {
                code_hash,
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_current_version_detected() {
        let registry = ContractRegistry::new()
            .with_contract(DasContractName::AccountCellType, H256([7; 32]));
        let tx = Transaction {
            outputs: vec![output_with_type(None), output_with_type(Some(H256([7; 32])))],
            ..Default::default()
        };
        assert!(is_current_version_tx(&tx, &registry, DasContractName::AccountCellType).unwrap());
    }

    #[test]
    fn test_old_version_is_not_current() {
        let registry = ContractRegistry::new()
            .with_contract(DasContractName::AccountCellType, H256([7; 32]));
        let tx = Transaction {
            outputs: vec![output_with_type(Some(H256([6; 32])))],
            ..Default::default()
        };
        assert!(!is_current_version_tx(&tx, &registry, DasContractName::AccountCellType).unwrap());
        assert!(is_current_version_tx(&tx, &registry, DasContractName::IncomeCellType).is_err());
    }
}
