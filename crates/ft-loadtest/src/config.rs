//! Fungible-token workload configuration.

use std::path::PathBuf;

use clap::Args;

use crate::MAX_ACCOUNT_ID_LEN;

/// Number of passive accounts created and registered per batch.
pub const DEFAULT_PASSIVE_BATCH_SIZE: u64 = 10_000;

/// Concurrent passive-account registrations within a batch.
pub const DEFAULT_REGISTRATION_CONCURRENCY: usize = 4;

/// CLI arguments for the fungible-token workload, flattened into the load-test harness CLI.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct FtArgs {
    /// Path to the compiled fungible-token contract.
    #[arg(long = "fungible-token-wasm", default_value = "res/fungible_token.wasm")]
    pub fungible_token_wasm: PathBuf,

    /// How many FT contracts to spawn from this worker (contracts are never shared between
    /// workers).
    #[arg(long = "num-ft-contracts", default_value_t = 4)]
    pub num_ft_contracts: usize,

    /// Name FT contracts deterministically from the worker account and run id.
    #[arg(long = "fixed-contract-names")]
    pub fixed_contract_names: bool,

    /// Number of passive users to create in each FT contract.
    #[arg(long = "num-passive-users", default_value_t = 0)]
    pub num_passive_users: u64,

    /// Run identifier embedded in fixed contract names.
    ///
    /// Prefixed so it does not collide with a harness-level `--run-id`.
    #[arg(id = "ft_run_id", long = "ft-run-id", env = "FT_RUN_ID", default_value = "")]
    pub run_id: String,
}

/// Configuration for provisioning fungible-token contracts on one worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FtConfig {
    /// Path to the contract code.
    pub contract_code: PathBuf,
    /// Contracts installed by this worker.
    pub num_contracts: usize,
    /// Whether contract names derive from the run id instead of being random.
    pub fixed_contract_names: bool,
    /// Run identifier used in fixed contract names.
    pub run_id: String,
    /// Passive users provisioned per contract.
    pub num_passive_users: u64,
    /// Upper bound on derived account identity length.
    pub max_account_id_len: usize,
    /// Passive accounts created per batch.
    pub passive_batch_size: u64,
    /// Concurrent passive registrations within a batch.
    pub registration_concurrency: usize,
}

impl Default for FtConfig {
    fn default() -> Self {
        Self {
            contract_code: PathBuf::from("res/fungible_token.wasm"),
            num_contracts: 4,
            fixed_contract_names: false,
            run_id: String::new(),
            num_passive_users: 0,
            max_account_id_len: MAX_ACCOUNT_ID_LEN,
            passive_batch_size: DEFAULT_PASSIVE_BATCH_SIZE,
            registration_concurrency: DEFAULT_REGISTRATION_CONCURRENCY,
        }
    }
}

impl FtConfig {
    /// Sets the contract code path.
    pub fn with_contract_code(mut self, path: impl Into<PathBuf>) -> Self {
        self.contract_code = path.into();
        self
    }

    /// Sets the number of contracts per worker.
    pub fn with_num_contracts(mut self, n: usize) -> Self {
        self.num_contracts = n;
        self
    }

    /// Names contracts deterministically from `run_id`.
    pub fn with_fixed_contract_names(mut self, run_id: impl Into<String>) -> Self {
        self.fixed_contract_names = true;
        self.run_id = run_id.into();
        self
    }

    /// Sets the number of passive users per contract.
    pub fn with_num_passive_users(mut self, n: u64) -> Self {
        self.num_passive_users = n;
        self
    }

    /// Sets the maximum derived account identity length.
    pub fn with_max_account_id_len(mut self, len: usize) -> Self {
        self.max_account_id_len = len;
        self
    }

    /// Sets the passive account batch size.
    pub fn with_passive_batch_size(mut self, n: u64) -> Self {
        self.passive_batch_size = n;
        self
    }

    /// Sets the registration concurrency within a batch.
    pub fn with_registration_concurrency(mut self, n: usize) -> Self {
        self.registration_concurrency = n;
        self
    }
}

impl From<FtArgs> for FtConfig {
    fn from(args: FtArgs) -> Self {
        Self {
            contract_code: args.fungible_token_wasm,
            num_contracts: args.num_ft_contracts,
            fixed_contract_names: args.fixed_contract_names,
            run_id: args.run_id,
            num_passive_users: args.num_passive_users,
            ..Self::default()
        }
    }
}
