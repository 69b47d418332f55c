//! Per-worker setup of the fungible-token workload.

use bytes::Bytes;
use eyre::{Result, WrapErr};
use tracing::info;

use crate::{
    Account, FtConfig, FtContract, NodeClient, PassiveUserProvisioner, fixed_contract_id,
    random_account_id,
};

/// Suffix of randomly named contract accounts.
const RANDOM_CONTRACT_SUFFIX: &str = "_ft";

/// Installs `config.num_contracts` token contracts under `funding` and provisions their
/// passive users.
///
/// Each contract is its own distributor. Contracts are set up one after another. The passive
/// accounts are created once, with the first contract, and registered on every contract.
pub async fn setup_contracts<N>(
    config: &FtConfig,
    node: &N,
    funding: &Account,
) -> Result<Vec<FtContract>>
where
    N: NodeClient + ?Sized,
{
    let code = tokio::fs::read(&config.contract_code).await.wrap_err_with(|| {
        format!("Failed to read contract code from {}", config.contract_code.display())
    })?;
    let code = Bytes::from(code);
    let provisioner = PassiveUserProvisioner::from(config);

    let mut contracts = Vec::with_capacity(config.num_contracts);
    for i in 0..config.num_contracts {
        let account = contract_account(config, funding, i)?;
        let mut contract = FtContract::new(account.clone(), account, code.clone());

        contract
            .install(node, funding)
            .await
            .wrap_err_with(|| format!("Failed to install contract {}", contract.id()))?;

        // passive accounts belong to the worker; later contracts only register them
        if config.num_passive_users > 0 {
            let num = config.num_passive_users;
            let population = if i == 0 {
                provisioner.ensure_population(&mut contract, num, node, funding).await
            } else {
                provisioner.register_population(&mut contract, num, node, funding).await
            };
            population.wrap_err_with(|| {
                format!("Failed to provision passive users for {}", contract.id())
            })?;
        }

        info!(contract = %contract.id(), index = i, worker = %funding.id, "Finished contract setup");
        contracts.push(contract);
    }

    Ok(contracts)
}

/// Builds the account for contract `index`: seeded from a fixed name, or random.
fn contract_account(config: &FtConfig, funding: &Account, index: usize) -> Result<Account> {
    if config.fixed_contract_names {
        let id = fixed_contract_id(&funding.id, &config.run_id, index)?;
        Ok(Account::from_seed(id))
    } else {
        let id = random_account_id(&funding.id, RANDOM_CONTRACT_SUFFIX)?;
        Ok(Account::random(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funding() -> Account {
        Account::from_seed("bench.test".parse().unwrap())
    }

    #[test]
    fn test_fixed_contract_accounts_are_reproducible() {
        let config = FtConfig::default().with_fixed_contract_names("9");
        let a = contract_account(&config, &funding(), 1).unwrap();
        let b = contract_account(&config, &funding(), 1).unwrap();
        assert_eq!(a.id, "ft9_1.bench.test");
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_contract_accounts_differ() {
        let config = FtConfig::default();
        let a = contract_account(&config, &funding(), 0).unwrap();
        let b = contract_account(&config, &funding(), 0).unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.id.as_str().ends_with("_ft.bench.test"));
    }

    #[test]
    fn test_invalid_run_id_is_rejected() {
        let config = FtConfig::default().with_fixed_contract_names("Run 1");
        assert!(contract_account(&config, &funding(), 0).is_err());
    }
}
