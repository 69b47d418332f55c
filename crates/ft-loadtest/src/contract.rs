//! A fungible-token contract under load and its on-chain installation.

use bytes::Bytes;
use tracing::{debug, info};

use crate::{
    Account, AccountId, Balance, NodeClient, ONE_NATIVE, ProvisioningError, RegisteredUsers,
    SampleError, Transaction, deploy_ft, ft_transfer, init_ft,
};

/// Native balance given to a freshly created contract account.
///
/// Kept small: registering users pay for their own storage.
pub const CONTRACT_INIT_BALANCE: Balance = 100 * ONE_NATIVE;

/// A fungible-token contract, the account that hands out its tokens, and the users registered
/// on it.
#[derive(Debug, Clone)]
pub struct FtContract {
    /// Account the contract code is deployed to.
    pub account: Account,
    /// Account funding new users; always registered, and the fallback transfer receiver.
    pub distributor: Account,
    /// Contract code blob.
    pub code: Bytes,
    pub(crate) registered_users: RegisteredUsers,
}

impl FtContract {
    /// Creates a contract that has not been installed yet.
    pub fn new(account: Account, distributor: Account, code: Bytes) -> Self {
        Self { account, distributor, code, registered_users: RegisteredUsers::new() }
    }

    /// Returns the contract's identity.
    pub fn id(&self) -> &AccountId {
        &self.account.id
    }

    /// Returns the users registered so far.
    pub fn registered_users(&self) -> &RegisteredUsers {
        &self.registered_users
    }

    /// Creates the contract account if needed, then deploys and initializes the contract.
    ///
    /// Deployment is gated on account existence only. An account that exists but whose
    /// initialization never landed is left as is.
    pub async fn install<N>(&self, node: &N, parent: &Account) -> Result<(), ProvisioningError>
    where
        N: NodeClient + ?Sized,
    {
        let existed = node
            .prepare_account(&self.account, parent, CONTRACT_INIT_BALANCE, "create contract account")
            .await?;
        if existed {
            info!(contract = %self.id(), "Contract account already exists, skipping deployment");
            return Ok(());
        }

        debug!(contract = %self.id(), code_len = self.code.len(), "Deploying contract");
        node.submit_and_confirm(deploy_ft(&self.account, self.code.clone()), "deploy ft").await?;
        self.init_contract(node).await?;

        info!(contract = %self.id(), "Contract installed");
        Ok(())
    }

    /// Runs the one-time token initialization.
    pub async fn init_contract<N>(&self, node: &N) -> Result<(), ProvisioningError>
    where
        N: NodeClient + ?Sized,
    {
        node.submit_and_confirm(init_ft(&self.account), "init ft").await?;
        Ok(())
    }

    /// Builds a transfer of `amount` tokens from `sender` to `receiver`.
    pub fn transfer(&self, sender: &Account, receiver: &AccountId, amount: Balance) -> Transaction {
        ft_transfer(self.id(), sender, receiver, amount)
    }

    /// Draws `k` receivers for `sender`.
    ///
    /// A draw equal to `sender` becomes the distributor, which may then appear twice.
    pub fn random_receivers(
        &self,
        sender: &AccountId,
        k: usize,
    ) -> Result<Vec<AccountId>, SampleError> {
        self.registered_users.sample(sender, &self.distributor.id, k)
    }

    /// Draws a single receiver for `sender`.
    pub fn random_receiver(&self, sender: &AccountId) -> Result<AccountId, SampleError> {
        let mut receivers = self.random_receivers(sender, 1)?;
        receivers.pop().ok_or(SampleError::InsufficientPopulation { requested: 1, available: 0 })
    }
}
