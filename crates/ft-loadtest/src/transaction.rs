//! Transactions submitted through the [`NodeClient`](crate::NodeClient).
//!
//! Only the shape of each transaction is modelled here. Signing, nonces and the wire
//! encoding belong to the node collaborator.

use bytes::Bytes;
use serde_json::{Value, json};

use crate::{Account, AccountId};

/// Smallest indivisible unit of native balance.
pub type Balance = u128;

/// Units of gas attached to a function call.
pub type Gas = u64;

/// One teragas.
pub const TGAS: Gas = 1_000_000_000_000;

/// One whole native token in minor units.
pub const ONE_NATIVE: Balance = 1_000_000_000_000_000_000_000_000;

/// Gas attached to every token call.
///
/// Congestion control sizes delayed-receipt queues from attached gas, so calls attach only
/// what they need rather than the maximum.
pub const FT_CALL_GAS: Gas = 10 * TGAS;

/// Token total supply minted to the owner on initialization.
pub const FT_TOTAL_SUPPLY: Balance = 1_000_000_000_000_000_000_000_000_000_000_000;

/// Deposit attached to `storage_deposit`, covering one account's storage on the contract.
pub const STORAGE_DEPOSIT: Balance = 100_000_000_000_000_000_000_000;

/// Deposit attached to `ft_transfer`; a non-zero deposit rejects calls from restricted keys.
pub const TRANSFER_DEPOSIT: Balance = 1;

/// Token balance handed to each newly registered active user.
pub const USER_FUNDING_AMOUNT: Balance = 100_000_000;

/// Method names understood by the fungible-token contract.
pub mod methods {
    /// Initializes the contract with default metadata.
    pub const NEW_DEFAULT_META: &str = "new_default_meta";
    /// Reserves contract storage for an account.
    pub const STORAGE_DEPOSIT: &str = "storage_deposit";
    /// Moves tokens between registered accounts.
    pub const FT_TRANSFER: &str = "ft_transfer";
}

/// A call into a contract method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// Account signing and paying for the call.
    pub signer: Account,
    /// Contract receiving the call.
    pub receiver_id: AccountId,
    /// Contract method name.
    pub method_name: String,
    /// JSON arguments.
    pub args: Value,
    /// Attached deposit.
    pub deposit: Balance,
    /// Attached gas.
    pub gas: Gas,
}

impl FunctionCall {
    /// Returns the account that signs the call.
    pub fn sender_id(&self) -> &AccountId {
        &self.signer.id
    }
}

/// Deploys contract code to the signer's own account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployContract {
    /// Account receiving the code.
    pub signer: Account,
    /// Contract code blob.
    pub code: Bytes,
    /// Short name of the contract, for logs.
    pub name: String,
}

/// Any transaction this crate submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// A function call.
    FunctionCall(FunctionCall),
    /// A code deployment.
    DeployContract(DeployContract),
}

impl Transaction {
    /// Returns the account that signs the transaction.
    pub fn signer(&self) -> &Account {
        match self {
            Self::FunctionCall(call) => &call.signer,
            Self::DeployContract(deploy) => &deploy.signer,
        }
    }

    /// Returns the function call, if this is one.
    pub fn as_function_call(&self) -> Option<&FunctionCall> {
        match self {
            Self::FunctionCall(call) => Some(call),
            Self::DeployContract(_) => None,
        }
    }
}

impl From<FunctionCall> for Transaction {
    fn from(call: FunctionCall) -> Self {
        Self::FunctionCall(call)
    }
}

impl From<DeployContract> for Transaction {
    fn from(deploy: DeployContract) -> Self {
        Self::DeployContract(deploy)
    }
}

/// Deploys the token contract code to `contract`.
pub fn deploy_ft(contract: &Account, code: Bytes) -> Transaction {
    DeployContract { signer: contract.clone(), code, name: "FT".to_string() }.into()
}

/// Initializes the token contract with `contract` as owner of the whole supply.
pub fn init_ft(contract: &Account) -> Transaction {
    FunctionCall {
        signer: contract.clone(),
        receiver_id: contract.id.clone(),
        method_name: methods::NEW_DEFAULT_META.to_string(),
        args: json!({
            "owner_id": contract.id,
            "total_supply": FT_TOTAL_SUPPLY.to_string(),
        }),
        deposit: 0,
        gas: FT_CALL_GAS,
    }
    .into()
}

/// Registers storage for `account` on `contract`, signed and paid for by `account`.
pub fn storage_deposit(contract: &AccountId, account: &Account) -> Transaction {
    FunctionCall {
        signer: account.clone(),
        receiver_id: contract.clone(),
        method_name: methods::STORAGE_DEPOSIT.to_string(),
        args: json!({ "account_id": account.id }),
        deposit: STORAGE_DEPOSIT,
        gas: FT_CALL_GAS,
    }
    .into()
}

/// Transfers `amount` tokens of `contract` from `sender` to `receiver`.
pub fn ft_transfer(
    contract: &AccountId,
    sender: &Account,
    receiver: &AccountId,
    amount: Balance,
) -> Transaction {
    FunctionCall {
        signer: sender.clone(),
        receiver_id: contract.clone(),
        method_name: methods::FT_TRANSFER.to_string(),
        args: json!({
            "receiver_id": receiver,
            "amount": amount.to_string(),
        }),
        deposit: TRANSFER_DEPOSIT,
        gas: FT_CALL_GAS,
    }
    .into()
}
