//! Onboarding of active (signing) users onto a token contract.
//!
//! Registration is two separate transactions with no atomicity between them: a storage
//! deposit signed by the user, then a token transfer from the distributor. Both are
//! idempotent on-chain, so a failed registration is re-driven from the phase that failed.

use tracing::debug;

use crate::{
    Account, FtContract, NodeClient, RegistrationError, USER_FUNDING_AMOUNT, storage_deposit,
};

/// Label for storage registration submissions.
pub(crate) const INIT_ACCOUNT_LABEL: &str = "Init FT Account";

/// Label for user funding submissions.
const FUNDING_LABEL: &str = "FT Funding";

/// A step of user registration, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegistrationPhase {
    /// The user reserves storage on the contract.
    StorageDeposit,
    /// The distributor transfers the initial token balance to the user.
    Funding,
}

impl FtContract {
    /// Registers `user` on the contract and funds it with tokens.
    ///
    /// On success the user becomes an eligible transfer receiver. On failure nothing is
    /// recorded; [`RegistrationError::phase`] names the phase to pass to
    /// [`Self::resume_registration`].
    pub async fn register_user<N>(&mut self, node: &N, user: &Account) -> Result<(), RegistrationError>
    where
        N: NodeClient + ?Sized,
    {
        self.resume_registration(node, user, RegistrationPhase::StorageDeposit).await
    }

    /// Runs registration for `user` starting at `from`, skipping earlier phases.
    pub async fn resume_registration<N>(
        &mut self,
        node: &N,
        user: &Account,
        from: RegistrationPhase,
    ) -> Result<(), RegistrationError>
    where
        N: NodeClient + ?Sized,
    {
        if from <= RegistrationPhase::StorageDeposit {
            self.register_storage(node, user).await?;
        }
        self.fund_user(node, user).await?;

        debug!(contract = %self.id(), user = %user.id, "User registered");
        self.registered_users.push(user.id.clone());
        Ok(())
    }

    /// Reserves contract storage for `user`, signed by `user`.
    pub async fn register_storage<N>(&self, node: &N, user: &Account) -> Result<(), RegistrationError>
    where
        N: NodeClient + ?Sized,
    {
        node.submit_and_confirm(storage_deposit(self.id(), user), INIT_ACCOUNT_LABEL)
            .await
            .map_err(RegistrationError::StorageDeposit)
    }

    /// Transfers the initial token balance from the distributor to `user`.
    pub async fn fund_user<N>(&self, node: &N, user: &Account) -> Result<(), RegistrationError>
    where
        N: NodeClient + ?Sized,
    {
        let tx = self.transfer(&self.distributor, &user.id, USER_FUNDING_AMOUNT);
        node.submit_and_confirm(tx, FUNDING_LABEL).await.map_err(RegistrationError::Funding)
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

    fn user() -> Account {
        Account::from_seed("alice.bench.test".parse().unwrap())
    }

    fn method(tx: &Transaction) -> &str {
        &tx.as_function_call().unwrap().method_name
    }

    #[tokio::test]
    async fn test_register_user_runs_both_phases_in_order() {
        let mut contract = contract();
        let user = user();
        let mut node = MockNodeClient::new();
        let mut seq = mockall::Sequence::new();

        let signer = user.clone();
        node.expect_submit_and_confirm()
            .withf(move |tx, label| {
                method(tx) == methods::STORAGE_DEPOSIT
                    && tx.signer() == &signer
                    && label == INIT_ACCOUNT_LABEL
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        let distributor = contract.distributor.clone();
        node.expect_submit_and_confirm()
            .withf(move |tx, label| {
                let call = tx.as_function_call().unwrap();
                call.method_name == methods::FT_TRANSFER
                    && call.signer == distributor
                    && call.args["receiver_id"] == "alice.bench.test"
                    && call.args["amount"] == "100000000"
                    && label == FUNDING_LABEL
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        contract.register_user(&node, &user).await.unwrap();

        assert_eq!(contract.registered_users().as_slice(), &[user.id]);
    }

    #[tokio::test]
    async fn test_storage_failure_records_nothing() {
        let mut contract = contract();
        let mut node = MockNodeClient::new();
        node.expect_submit_and_confirm()
            .times(1)
            .returning(|_, _| Err(NodeError::Rpc("connection reset".into())));

        let err = contract.register_user(&node, &user()).await.unwrap_err();

        assert_eq!(err.phase(), RegistrationPhase::StorageDeposit);
        assert!(contract.registered_users().is_empty());
    }

    #[tokio::test]
    async fn test_funding_failure_resumes_from_funding() {
        let mut contract = contract();
        let user = user();

        let mut node = MockNodeClient::new();
        node.expect_submit_and_confirm()
            .withf(|tx, _| method(tx) == methods::STORAGE_DEPOSIT)
            .times(1)
            .returning(|_, _| Ok(()));
        node.expect_submit_and_confirm()
            .withf(|tx, _| method(tx) == methods::FT_TRANSFER)
            .times(1)
            .returning(|_, label| Err(NodeError::Timeout { label: label.to_string() }));

        let err = contract.register_user(&node, &user).await.unwrap_err();
        assert_eq!(err.phase(), RegistrationPhase::Funding);
        assert!(contract.registered_users().is_empty());

        let mut retry = MockNodeClient::new();
        retry
            .expect_submit_and_confirm()
            .withf(|tx, _| method(tx) == methods::FT_TRANSFER)
            .times(1)
            .returning(|_, _| Ok(()));

        contract.resume_registration(&retry, &user, err.phase()).await.unwrap();
        assert!(contract.registered_users().contains(&user.id));
    }
}
