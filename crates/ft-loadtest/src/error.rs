//! Error types for provisioning, registration and sampling.

use thiserror::Error;

use crate::{AccountId, RegistrationPhase};

/// An identity that fails the chain's naming rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountIdError {
    /// Shorter than the minimum identity length.
    #[error("account id `{0}` is too short")]
    TooShort(String),
    /// Longer than the maximum identity length.
    #[error("account id `{id}` is longer than {max} characters")]
    TooLong {
        /// The offending identity.
        id: String,
        /// The maximum allowed length.
        max: usize,
    },
    /// Contains a character outside lowercase alphanumerics and separators.
    #[error("account id `{id}` has invalid character {ch:?} at {pos}")]
    InvalidChar {
        /// The offending identity.
        id: String,
        /// The rejected character.
        ch: char,
        /// Byte position of the character.
        pos: usize,
    },
    /// Starts or ends with a separator, or has two separators in a row.
    #[error("account id `{id}` has a redundant separator at {pos}")]
    RedundantSeparator {
        /// The offending identity.
        id: String,
        /// Byte position of the separator.
        pos: usize,
    },
}

/// Failures reported by the node collaborator once its own retry budget is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// The RPC request itself failed.
    #[error("rpc error: {0}")]
    Rpc(String),
    /// The transaction was rejected or failed on-chain.
    #[error("transaction `{label}` rejected: {reason}")]
    Rejected {
        /// Label the transaction was submitted under.
        label: String,
        /// Rejection reason reported by the node.
        reason: String,
    },
    /// The transaction never reached a final outcome.
    #[error("transaction `{label}` was not confirmed in time")]
    Timeout {
        /// Label the transaction was submitted under.
        label: String,
    },
}

/// Errors raised while installing contracts or creating passive accounts.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// The parent identity leaves too little room for a distinguishing prefix.
    #[error(
        "parent account `{parent}` is too long to derive child accounts within {max_len} characters"
    )]
    IdBudget {
        /// The parent identity.
        parent: AccountId,
        /// The maximum identity length that was requested.
        max_len: usize,
    },
    /// A derived identity is not valid.
    #[error(transparent)]
    InvalidAccountId(#[from] AccountIdError),
    /// A submission failed after the collaborator's retries.
    #[error(transparent)]
    Submission(#[from] NodeError),
}

/// A failed user registration, tagged with the phase that failed.
///
/// Phases before the failing one have completed on-chain and are not rolled back.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The storage deposit call failed; nothing was recorded.
    #[error("storage registration failed")]
    StorageDeposit(#[source] NodeError),
    /// Storage was registered but the funding transfer failed.
    #[error("funding transfer failed")]
    Funding(#[source] NodeError),
}

impl RegistrationError {
    /// Returns the phase a retry should resume from.
    pub fn phase(&self) -> RegistrationPhase {
        match self {
            Self::StorageDeposit(_) => RegistrationPhase::StorageDeposit,
            Self::Funding(_) => RegistrationPhase::Funding,
        }
    }

    /// Returns the underlying node error.
    pub fn node_error(&self) -> &NodeError {
        match self {
            Self::StorageDeposit(err) | Self::Funding(err) => err,
        }
    }
}

/// Errors raised while sampling transfer receivers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    /// More receivers were requested than there are registered users.
    #[error("requested {requested} receivers but only {available} users are registered")]
    InsufficientPopulation {
        /// Number of receivers requested.
        requested: usize,
        /// Size of the registered-user set.
        available: usize,
    },
}
