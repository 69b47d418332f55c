#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/base/base/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod account;
pub use account::{Account, AccountId, AccountKey, MAX_ACCOUNT_ID_LEN, MIN_ACCOUNT_ID_LEN};

mod config;
pub use config::{
    DEFAULT_PASSIVE_BATCH_SIZE, DEFAULT_REGISTRATION_CONCURRENCY, FtArgs, FtConfig,
};

mod contract;
pub use contract::{CONTRACT_INIT_BALANCE, FtContract};

mod error;
pub use error::{AccountIdError, NodeError, ProvisioningError, RegistrationError, SampleError};

mod naming;
pub use naming::{PassiveAccountIds, fixed_contract_id, random_account_id};

mod node;
#[cfg(any(test, feature = "test-utils"))]
pub use node::MockNodeClient;
pub use node::{NodeClient, NodeResult};

mod provisioner;
pub use provisioner::{PASSIVE_ACCOUNT_BALANCE, PassiveUserProvisioner, PopulationReport};

mod registrar;
pub use registrar::RegistrationPhase;

mod sampler;
pub use sampler::RegisteredUsers;

mod setup;
pub use setup::setup_contracts;

mod transaction;
pub use transaction::{
    Balance, DeployContract, FT_CALL_GAS, FT_TOTAL_SUPPLY, FunctionCall, Gas, ONE_NATIVE,
    STORAGE_DEPOSIT, TGAS, TRANSFER_DEPOSIT, Transaction, USER_FUNDING_AMOUNT, deploy_ft,
    ft_transfer, init_ft, methods, storage_deposit,
};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
