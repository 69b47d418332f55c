//! The registered-user set and transfer receiver sampling.

use rand::{Rng, seq::IndexedRandom};

use crate::{AccountId, SampleError};

/// Identities registered on a token contract and usable as transfer receivers.
///
/// Append-only. Not synchronized: hosts sharing one set across threads must wrap it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisteredUsers {
    users: Vec<AccountId>,
}

impl RegisteredUsers {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a registered identity.
    pub fn push(&mut self, account_id: AccountId) {
        self.users.push(account_id);
    }

    /// Returns the number of registered identities.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if nobody is registered yet.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Returns `true` if `account_id` is registered.
    pub fn contains(&self, account_id: &AccountId) -> bool {
        self.users.contains(account_id)
    }

    /// Returns the identities in registration order.
    pub fn as_slice(&self) -> &[AccountId] {
        &self.users
    }

    /// Iterates over the identities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &AccountId> {
        self.users.iter()
    }

    /// Draws `k` receivers for `sender` using a fresh thread-local generator.
    ///
    /// See [`Self::sample_with`].
    pub fn sample(
        &self,
        sender: &AccountId,
        fallback: &AccountId,
        k: usize,
    ) -> Result<Vec<AccountId>, SampleError> {
        self.sample_with(&mut rand::rng(), sender, fallback, k)
    }

    /// Draws `k` distinct registered identities uniformly without replacement, then replaces
    /// any draw equal to `sender` with `fallback`.
    ///
    /// When both `sender` and `fallback` are drawn in the same call the result holds
    /// `fallback` twice.
    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        sender: &AccountId,
        fallback: &AccountId,
        k: usize,
    ) -> Result<Vec<AccountId>, SampleError> {
        if k > self.users.len() {
            return Err(SampleError::InsufficientPopulation {
                requested: k,
                available: self.users.len(),
            });
        }

        Ok(self
            .users
            .choose_multiple(rng, k)
            .map(|id| if id == sender { fallback.clone() } else { id.clone() })
            .collect())
    }
}

impl Extend<AccountId> for RegisteredUsers {
    fn extend<T: IntoIterator<Item = AccountId>>(&mut self, iter: T) {
        self.users.extend(iter);
    }
}

impl FromIterator<AccountId> for RegisteredUsers {
    fn from_iter<T: IntoIterator<Item = AccountId>>(iter: T) -> Self {
        Self { users: iter.into_iter().collect() }
    }
}
