//! The network collaborator consumed by provisioning.

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;

use crate::{Account, AccountId, Balance, NodeError, Transaction};

/// Result alias for [`NodeClient`] calls.
pub type NodeResult<T> = Result<T, NodeError>;

/// Access to the target chain.
///
/// Implementations own signing, nonce management, and retry/backoff. Errors surface only
/// once the implementation's own retry budget is spent.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait NodeClient: Debug + Send + Sync {
    /// Returns whether `account_id` exists in the current chain state.
    async fn account_exists(&self, account_id: &AccountId) -> NodeResult<bool>;

    /// Creates `account` funded with `balance` from `parent` unless it already exists.
    ///
    /// Returns `true` if the account existed before the call.
    async fn prepare_account(
        &self,
        account: &Account,
        parent: &Account,
        balance: Balance,
        reason: &str,
    ) -> NodeResult<bool>;

    /// Creates every account in `accounts`, each funded with `balance` from `parent`.
    async fn prepare_accounts(
        &self,
        accounts: &[Account],
        parent: &Account,
        balance: Balance,
        reason: &str,
    ) -> NodeResult<()>;

    /// Submits `tx` and waits until it is final.
    async fn submit_and_confirm(&self, tx: Transaction, label: &str) -> NodeResult<()>;

    /// Submits `tx` without waiting for an outcome.
    ///
    /// Best effort: a transaction the network later drops is not reported back.
    async fn submit_best_effort(&self, tx: Transaction, label: &str) -> NodeResult<()>;
}

#[async_trait]
impl<T: NodeClient + ?Sized> NodeClient for Arc<T> {
    async fn account_exists(&self, account_id: &AccountId) -> NodeResult<bool> {
        (**self).account_exists(account_id).await
    }

    async fn prepare_account(
        &self,
        account: &Account,
        parent: &Account,
        balance: Balance,
        reason: &str,
    ) -> NodeResult<bool> {
        (**self).prepare_account(account, parent, balance, reason).await
    }

    async fn prepare_accounts(
        &self,
        accounts: &[Account],
        parent: &Account,
        balance: Balance,
        reason: &str,
    ) -> NodeResult<()> {
        (**self).prepare_accounts(accounts, parent, balance, reason).await
    }

    async fn submit_and_confirm(&self, tx: Transaction, label: &str) -> NodeResult<()> {
        (**self).submit_and_confirm(tx, label).await
    }

    async fn submit_best_effort(&self, tx: Transaction, label: &str) -> NodeResult<()> {
        (**self).submit_best_effort(tx, label).await
    }
}
