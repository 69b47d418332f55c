//! Bulk creation of passive (receive-only) accounts registered on a token contract.

use futures::{StreamExt, stream};
use tracing::{debug, info, warn};

use crate::{
    Account, AccountId, Balance, FtConfig, FtContract, NodeClient, NodeResult,
    PassiveAccountIds, ProvisioningError, registrar::INIT_ACCOUNT_LABEL, storage_deposit,
};

/// Native balance given to each passive account, just enough for it to exist.
///
/// Contract storage is paid by the registration deposit.
pub const PASSIVE_ACCOUNT_BALANCE: Balance = 1;

/// What [`PassiveUserProvisioner::ensure_population`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationReport {
    /// Identities added to the registered-user set.
    pub registered: u64,
    /// Batches processed.
    pub batches: u64,
    /// Whether accounts were created on-chain, as opposed to found from a previous run.
    pub created: bool,
}

/// Creates passive accounts in fixed-size batches and registers them on a contract.
///
/// Batches run strictly in index order. Within a batch the accounts are created with one
/// batched call, then registered with bounded concurrency; the next batch starts only after
/// every registration in the current one has returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassiveUserProvisioner {
    batch_size: u64,
    concurrency: usize,
    max_account_id_len: usize,
}

impl Default for PassiveUserProvisioner {
    fn default() -> Self {
        Self::from(&FtConfig::default())
    }
}

impl From<&FtConfig> for PassiveUserProvisioner {
    fn from(config: &FtConfig) -> Self {
        Self::new(
            config.passive_batch_size,
            config.registration_concurrency,
            config.max_account_id_len,
        )
    }
}

impl PassiveUserProvisioner {
    /// Creates a provisioner. Zero batch size or concurrency is raised to one.
    pub fn new(batch_size: u64, concurrency: usize, max_account_id_len: usize) -> Self {
        Self { batch_size: batch_size.max(1), concurrency: concurrency.max(1), max_account_id_len }
    }

    /// Makes sure `num` passive accounts derived from `parent` exist and are registered on
    /// `contract`.
    ///
    /// If the last account (index `num - 1`) already exists, the whole population is assumed
    /// to come from a previous run: the identities are recorded without any on-chain work.
    /// Otherwise every batch is created from index zero; there is no per-batch checkpoint.
    ///
    /// Registrations are submitted best effort and recorded once submitted, so a
    /// registration the network drops still counts as registered here.
    pub async fn ensure_population<N>(
        &self,
        contract: &mut FtContract,
        num: u64,
        node: &N,
        parent: &Account,
    ) -> Result<PopulationReport, ProvisioningError>
    where
        N: NodeClient + ?Sized,
    {
        let ids = PassiveAccountIds::new(parent.id.clone(), self.max_account_id_len)?;
        if num == 0 {
            return Ok(PopulationReport { registered: 0, batches: 0, created: false });
        }

        let already_created = node.account_exists(&ids.account_id(num - 1)?).await?;
        let step = if already_created {
            info!(
                parent = %parent.id,
                contract = %contract.id(),
                num,
                "Skipping creation of passive users, already present"
            );
            BatchStep::Record
        } else {
            BatchStep::Create
        };

        self.run_batches(contract, &ids, num, node, parent, step).await
    }

    /// Registers the `num` passive accounts derived from `parent` on `contract` without
    /// creating them.
    ///
    /// Passive accounts belong to the worker, so every contract after the first one a worker
    /// installs reuses the accounts created for the first and only needs its own storage
    /// registration. The accounts must already exist.
    pub async fn register_population<N>(
        &self,
        contract: &mut FtContract,
        num: u64,
        node: &N,
        parent: &Account,
    ) -> Result<PopulationReport, ProvisioningError>
    where
        N: NodeClient + ?Sized,
    {
        let ids = PassiveAccountIds::new(parent.id.clone(), self.max_account_id_len)?;
        self.run_batches(contract, &ids, num, node, parent, BatchStep::Register).await
    }

    async fn run_batches<N>(
        &self,
        contract: &mut FtContract,
        ids: &PassiveAccountIds,
        num: u64,
        node: &N,
        parent: &Account,
        step: BatchStep,
    ) -> Result<PopulationReport, ProvisioningError>
    where
        N: NodeClient + ?Sized,
    {
        let num_batches = num.div_ceil(self.batch_size);
        for batch in 0..num_batches {
            let start = batch * self.batch_size;
            let end = (start + self.batch_size).min(num);

            match step {
                BatchStep::Record => {
                    let account_ids =
                        (start..end).map(|i| ids.account_id(i)).collect::<Result<Vec<_>, _>>()?;
                    contract.registered_users.extend(account_ids);
                }
                BatchStep::Create | BatchStep::Register => {
                    let accounts =
                        (start..end).map(|i| ids.account(i)).collect::<Result<Vec<_>, _>>()?;
                    if step == BatchStep::Create {
                        node.prepare_accounts(
                            &accounts,
                            parent,
                            PASSIVE_ACCOUNT_BALANCE,
                            "create passive user",
                        )
                        .await?;
                    }
                    self.register_batch(contract, accounts, node).await?;
                }
            }

            info!(
                parent = %parent.id,
                contract = %contract.id(),
                batch = batch + 1,
                num_batches,
                processed = end,
                "Processed passive user batch"
            );
        }

        Ok(PopulationReport {
            registered: num,
            batches: num_batches,
            created: step == BatchStep::Create,
        })
    }

    /// Registers one batch of accounts on `contract`, waiting for every registration.
    async fn register_batch<N>(
        &self,
        contract: &mut FtContract,
        accounts: Vec<Account>,
        node: &N,
    ) -> Result<(), ProvisioningError>
    where
        N: NodeClient + ?Sized,
    {
        let contract_id = contract.id().clone();
        let results: Vec<(AccountId, NodeResult<()>)> = stream::iter(accounts)
            .map(|account| {
                let contract_id = &contract_id;
                async move {
                    let result = register_passive_user(node, contract_id, &account).await;
                    (account.id, result)
                }
            })
            // results come back in index order
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut first_error = None;
        for (account_id, result) in results {
            match result {
                Ok(()) => contract.registered_users.push(account_id),
                Err(err) => {
                    warn!(account = %account_id, error = %err, "Passive user registration failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

/// What a batch does on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchStep {
    /// Record identities left by a previous run.
    Record,
    /// Create the accounts, then register them.
    Create,
    /// Register existing accounts.
    Register,
}

/// Submits storage registration for a passive account without waiting for finality.
async fn register_passive_user<N>(
    node: &N,
    contract_id: &AccountId,
    account: &Account,
) -> NodeResult<()>
where
    N: NodeClient + ?Sized,
{
    debug!(contract = %contract_id, account = %account.id, "Registering passive user");
    node.submit_best_effort(storage_deposit(contract_id, account), INIT_ACCOUNT_LABEL).await
}

impl FtContract {
    /// Creates `num` passive users under `parent` with the default batch layout.
    ///
    /// See [`PassiveUserProvisioner::ensure_population`].
    pub async fn create_passive_users<N>(
        &mut self,
        num: u64,
        node: &N,
        parent: &Account,
    ) -> Result<PopulationReport, ProvisioningError>
    where
        N: NodeClient + ?Sized,
    {
        PassiveUserProvisioner::default().ensure_population(self, num, node, parent).await
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::{MockNodeClient, NodeError, Transaction, methods};

    fn contract() -> FtContract {
        let account = Account::from_seed("ft.bench.test".parse().unwrap());
        FtContract::new(account.clone(), account, Bytes::new())
    }

    fn parent() -> Account {
        Account::from_seed("bench.test".parse().unwrap())
    }

    #[tokio::test]
    async fn test_precondition_fails_before_network() {
        let mut contract = contract();
        let node = MockNodeClient::new();
        let provisioner = PassiveUserProvisioner::new(10, 4, 15);

        let err = provisioner.ensure_population(&mut contract, 5, &node, &parent()).await.unwrap_err();

        assert!(matches!(err, ProvisioningError::IdBudget { max_len: 15, .. }));
    }

    #[tokio::test]
    async fn test_probe_checks_last_index() {
        let mut contract = contract();
        let ids = PassiveAccountIds::new(parent().id, 64).unwrap();
        let last = ids.account_id(24).unwrap();

        let mut node = MockNodeClient::new();
        node.expect_account_exists()
            .withf(move |id| *id == last)
            .times(1)
            .returning(|_| Ok(true));
        node.expect_prepare_accounts().never();
        node.expect_submit_best_effort().never();
        node.expect_submit_and_confirm().never();

        let report = PassiveUserProvisioner::new(10, 4, 64)
            .ensure_population(&mut contract, 25, &node, &parent())
            .await
            .unwrap();

        assert_eq!(report, PopulationReport { registered: 25, batches: 3, created: false });
        assert_eq!(contract.registered_users().len(), 25);
        assert_eq!(contract.registered_users().as_slice()[0], ids.account_id(0).unwrap());
    }

    #[tokio::test]
    async fn test_creates_batches_and_registers_best_effort() {
        let mut contract = contract();
        let mut node = MockNodeClient::new();
        node.expect_account_exists().times(1).returning(|_| Ok(false));
        node.expect_prepare_accounts()
            .withf(|accounts, _, balance, reason| {
                accounts.len() <= 2 && *balance == 1 && reason == "create passive user"
            })
            .times(2)
            .returning(|_, _, _, _| Ok(()));
        node.expect_submit_best_effort()
            .withf(|tx: &Transaction, label| {
                tx.as_function_call().is_some_and(|c| c.method_name == methods::STORAGE_DEPOSIT)
                    && label == INIT_ACCOUNT_LABEL
            })
            .times(3)
            .returning(|_, _| Ok(()));
        node.expect_submit_and_confirm().never();

        let report = PassiveUserProvisioner::new(2, 4, 64)
            .ensure_population(&mut contract, 3, &node, &parent())
            .await
            .unwrap();

        assert_eq!(report, PopulationReport { registered: 3, batches: 2, created: true });
        assert_eq!(contract.registered_users().len(), 3);
    }

    #[tokio::test]
    async fn test_registration_failure_fails_the_batch() {
        let mut contract = contract();
        let ids = PassiveAccountIds::new(parent().id, 64).unwrap();
        let failing = ids.account_id(1).unwrap();

        let mut node = MockNodeClient::new();
        node.expect_account_exists().returning(|_| Ok(false));
        node.expect_prepare_accounts().times(1).returning(|_, _, _, _| Ok(()));
        node.expect_submit_best_effort().times(4).returning(
            move |tx, _| {
                if tx.signer().id == failing {
                    Err(NodeError::Rpc("rate limited".into()))
                } else {
                    Ok(())
                }
            },
        );

        let err = PassiveUserProvisioner::new(10, 4, 64)
            .ensure_population(&mut contract, 4, &node, &parent())
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisioningError::Submission(NodeError::Rpc(_))));
        assert_eq!(contract.registered_users().len(), 3);
        assert!(!contract.registered_users().contains(&ids.account_id(1).unwrap()));
    }

    #[tokio::test]
    async fn test_empty_population_is_a_no_op() {
        let mut contract = contract();
        let node = MockNodeClient::new();

        let report = contract.create_passive_users(0, &node, &parent()).await.unwrap();

        assert_eq!(report, PopulationReport { registered: 0, batches: 0, created: false });
    }

    #[tokio::test]
    async fn test_register_population_registers_existing_accounts_on_contract() {
        let mut contract = contract();
        let contract_id = contract.id().clone();

        let mut node = MockNodeClient::new();
        node.expect_account_exists().never();
        node.expect_prepare_accounts().never();
        node.expect_submit_best_effort()
            .withf(move |tx: &Transaction, label| {
                tx.as_function_call().is_some_and(|c| {
                    c.method_name == methods::STORAGE_DEPOSIT && c.receiver_id == contract_id
                }) && label == INIT_ACCOUNT_LABEL
            })
            .times(3)
            .returning(|_, _| Ok(()));

        let report = PassiveUserProvisioner::new(2, 4, 64)
            .register_population(&mut contract, 3, &node, &parent())
            .await
            .unwrap();

        assert_eq!(report, PopulationReport { registered: 3, batches: 2, created: false });
        assert_eq!(contract.registered_users().len(), 3);
    }
}
