//! In-memory chain fake for exercising provisioning without a network.

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    Account, AccountId, Balance, NodeClient, NodeError, NodeResult, Transaction, methods,
};

/// How a transaction reached the fake node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Submitted with [`NodeClient::submit_and_confirm`].
    Confirmed,
    /// Submitted with [`NodeClient::submit_best_effort`].
    BestEffort,
}

/// A transaction seen by [`InMemoryNode`].
#[derive(Debug, Clone)]
pub struct SubmittedTx {
    /// The transaction.
    pub tx: Transaction,
    /// Label it was submitted under.
    pub label: String,
    /// Submission mode.
    pub mode: Submission,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<AccountId, Balance>,
    deployed: HashSet<AccountId>,
    initialized: HashSet<AccountId>,
    storage: HashSet<(AccountId, AccountId)>,
    submitted: Vec<SubmittedTx>,
    batch_sizes: Vec<usize>,
    probes: Vec<AccountId>,
    failing_labels: HashMap<String, NodeError>,
    failing_signers: HashMap<AccountId, NodeError>,
    drop_best_effort: bool,
}

/// A recording fake of the chain.
///
/// Applies account creation, deployment, initialization and storage registration to an
/// in-memory state, records every call, and tracks how many best-effort submissions were in
/// flight at once.
#[derive(Debug, Default)]
pub struct InMemoryNode {
    state: Mutex<State>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl InMemoryNode {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an existing account.
    pub fn with_account(self, account_id: AccountId, balance: Balance) -> Self {
        self.state.lock().accounts.insert(account_id, balance);
        self
    }

    /// Fails every submission under `label` with `error`.
    pub fn fail_label(&self, label: &str, error: NodeError) {
        self.state.lock().failing_labels.insert(label.to_string(), error);
    }

    /// Fails every submission signed by `signer` with `error`.
    pub fn fail_signer(&self, signer: AccountId, error: NodeError) {
        self.state.lock().failing_signers.insert(signer, error);
    }

    /// Clears all injected failures.
    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.failing_labels.clear();
        state.failing_signers.clear();
    }

    /// Accepts best-effort submissions without applying them, as a network dropping them
    /// would.
    pub fn drop_best_effort(&self, drop: bool) {
        self.state.lock().drop_best_effort = drop;
    }

    /// Returns whether `account_id` exists.
    pub fn has_account(&self, account_id: &AccountId) -> bool {
        self.state.lock().accounts.contains_key(account_id)
    }

    /// Returns the number of existing accounts.
    pub fn num_accounts(&self) -> usize {
        self.state.lock().accounts.len()
    }

    /// Returns whether code was deployed to `contract`.
    pub fn is_deployed(&self, contract: &AccountId) -> bool {
        self.state.lock().deployed.contains(contract)
    }

    /// Returns whether `contract` was initialized.
    pub fn is_initialized(&self, contract: &AccountId) -> bool {
        self.state.lock().initialized.contains(contract)
    }

    /// Returns whether `account` holds storage on `contract`.
    pub fn has_storage(&self, contract: &AccountId, account: &AccountId) -> bool {
        self.state.lock().storage.contains(&(contract.clone(), account.clone()))
    }

    /// Returns every accepted submission in arrival order.
    pub fn submitted(&self) -> Vec<SubmittedTx> {
        self.state.lock().submitted.clone()
    }

    /// Returns accepted submissions under `label`.
    pub fn submitted_with_label(&self, label: &str) -> Vec<SubmittedTx> {
        self.state.lock().submitted.iter().filter(|s| s.label == label).cloned().collect()
    }

    /// Returns the size of every [`NodeClient::prepare_accounts`] call in order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state.lock().batch_sizes.clone()
    }

    /// Returns every identity passed to [`NodeClient::account_exists`].
    pub fn probes(&self) -> Vec<AccountId> {
        self.state.lock().probes.clone()
    }

    /// Returns the most best-effort submissions that were ever in flight together.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn injected_failure(&self, tx: &Transaction, label: &str) -> Option<NodeError> {
        let state = self.state.lock();
        state
            .failing_labels
            .get(label)
            .or_else(|| state.failing_signers.get(&tx.signer().id))
            .cloned()
    }

    fn accept(&self, tx: Transaction, label: &str, mode: Submission) -> NodeResult<()> {
        if let Some(err) = self.injected_failure(&tx, label) {
            return Err(err);
        }

        let mut state = self.state.lock();
        let apply = mode == Submission::Confirmed || !state.drop_best_effort;
        if apply {
            match &tx {
                Transaction::DeployContract(deploy) => {
                    state.deployed.insert(deploy.signer.id.clone());
                }
                Transaction::FunctionCall(call) if call.method_name == methods::NEW_DEFAULT_META => {
                    state.initialized.insert(call.receiver_id.clone());
                }
                Transaction::FunctionCall(call) if call.method_name == methods::STORAGE_DEPOSIT => {
                    state.storage.insert((call.receiver_id.clone(), call.signer.id.clone()));
                }
                Transaction::FunctionCall(_) => {}
            }
        }
        state.submitted.push(SubmittedTx { tx, label: label.to_string(), mode });
        Ok(())
    }
}

#[async_trait]
impl NodeClient for InMemoryNode {
    async fn account_exists(&self, account_id: &AccountId) -> NodeResult<bool> {
        let mut state = self.state.lock();
        state.probes.push(account_id.clone());
        Ok(state.accounts.contains_key(account_id))
    }

    async fn prepare_account(
        &self,
        account: &Account,
        _parent: &Account,
        balance: Balance,
        _reason: &str,
    ) -> NodeResult<bool> {
        let mut state = self.state.lock();
        if state.accounts.contains_key(&account.id) {
            return Ok(true);
        }
        state.accounts.insert(account.id.clone(), balance);
        Ok(false)
    }

    async fn prepare_accounts(
        &self,
        accounts: &[Account],
        _parent: &Account,
        balance: Balance,
        _reason: &str,
    ) -> NodeResult<()> {
        let mut state = self.state.lock();
        state.batch_sizes.push(accounts.len());
        for account in accounts {
            state.accounts.entry(account.id.clone()).or_insert(balance);
        }
        Ok(())
    }

    async fn submit_and_confirm(&self, tx: Transaction, label: &str) -> NodeResult<()> {
        self.accept(tx, label, Submission::Confirmed)
    }

    async fn submit_best_effort(&self, tx: Transaction, label: &str) -> NodeResult<()> {
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        // let sibling submissions start before this one finishes
        tokio::task::yield_now().await;

        let result = self.accept(tx, label, Submission::BestEffort);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
