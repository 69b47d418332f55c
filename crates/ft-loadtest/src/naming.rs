//! Account identity derivation.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{Account, AccountId, MAX_ACCOUNT_ID_LEN, ProvisioningError};

/// Characters used in generated identity prefixes.
const PREFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Smallest prefix that still tells derived accounts apart.
const MIN_PREFIX_LEN: usize = 5;

/// Length of the random part of a randomly named contract.
const RANDOM_NAME_LEN: usize = 12;

/// Derives child account identities under a parent account.
///
/// The identity for index `i` is a prefix drawn from a generator seeded with `i` alone, so the
/// same index always yields the same identity without any stored state.
#[derive(Debug, Clone)]
pub struct PassiveAccountIds {
    parent: AccountId,
    prefix_len: usize,
}

impl PassiveAccountIds {
    /// Creates a generator filling identities up to `max_len` characters.
    ///
    /// Fails if `parent` leaves no more than four characters for the prefix.
    pub fn new(parent: AccountId, max_len: usize) -> Result<Self, ProvisioningError> {
        let max_len = max_len.min(MAX_ACCOUNT_ID_LEN);
        let prefix_len = max_len.saturating_sub(parent.len() + 1);
        if prefix_len < MIN_PREFIX_LEN {
            return Err(ProvisioningError::IdBudget { parent, max_len });
        }
        Ok(Self { parent, prefix_len })
    }

    /// Returns the number of generated characters in each identity.
    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// Returns the identity for `index`.
    pub fn account_id(&self, index: u64) -> Result<AccountId, ProvisioningError> {
        let prefix = seeded_prefix(index, self.prefix_len);
        Ok(self.parent.sub_account(&prefix)?)
    }

    /// Returns the account for `index`, with its key seeded from the identity.
    pub fn account(&self, index: u64) -> Result<Account, ProvisioningError> {
        self.account_id(index).map(Account::from_seed)
    }
}

/// Draws `len` prefix characters from a generator seeded with `seed`.
fn seeded_prefix(seed: u64, len: usize) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    random_prefix(&mut rng, len)
}

fn random_prefix<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| PREFIX_CHARSET[rng.random_range(0..PREFIX_CHARSET.len())] as char).collect()
}

/// Returns the fixed name of contract `index` for `run_id`: `ft{run_id}_{index}.{parent}`.
pub fn fixed_contract_id(
    parent: &AccountId,
    run_id: &str,
    index: usize,
) -> Result<AccountId, ProvisioningError> {
    Ok(parent.sub_account(&format!("ft{run_id}_{index}"))?)
}

/// Returns a fresh random identity under `parent` ending in `suffix`.
pub fn random_account_id(parent: &AccountId, suffix: &str) -> Result<AccountId, ProvisioningError> {
    let prefix = random_prefix(&mut rand::rng(), RANDOM_NAME_LEN);
    Ok(parent.sub_account(&format!("{prefix}{suffix}"))?)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn parent() -> AccountId {
        "bench.test".parse().unwrap()
    }

    #[test]
    fn test_prefix_budget() {
        let ids = PassiveAccountIds::new(parent(), 64).unwrap();
        assert_eq!(ids.prefix_len(), 53);

        let id = ids.account_id(0).unwrap();
        assert_eq!(id.len(), 64);
        assert!(id.as_str().ends_with(".bench.test"));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = PassiveAccountIds::new(parent(), 64).unwrap();
        let b = PassiveAccountIds::new(parent(), 64).unwrap();
        for i in [0, 1, 9_999, 10_000, 24_999, u64::MAX] {
            assert_eq!(a.account_id(i).unwrap(), b.account_id(i).unwrap());
        }
        // derivation does not depend on call order
        let later = a.account_id(7).unwrap();
        let _ = a.account_id(3).unwrap();
        assert_eq!(a.account_id(7).unwrap(), later);
    }

    #[test]
    fn test_derived_ids_are_distinct() {
        let ids = PassiveAccountIds::new(parent(), 64).unwrap();
        let derived: std::collections::HashSet<_> =
            (0..1_000).map(|i| ids.account_id(i).unwrap()).collect();
        assert_eq!(derived.len(), 1_000);
    }

    #[test]
    fn test_seeded_account_key_matches_identity() {
        let ids = PassiveAccountIds::new(parent(), 64).unwrap();
        let account = ids.account(42).unwrap();
        assert_eq!(account, Account::from_seed(ids.account_id(42).unwrap()));
    }

    #[rstest]
    // 16 - 10 - 1 = 5 characters left
    #[case::smallest_budget(16, true)]
    // 15 - 10 - 1 = 4 characters left
    #[case::four_left(15, false)]
    #[case::no_room(10, false)]
    #[case::zero(0, false)]
    fn test_id_budget_precondition(#[case] max_len: usize, #[case] ok: bool) {
        let result = PassiveAccountIds::new(parent(), max_len);
        assert_eq!(result.is_ok(), ok);
        if !ok {
            assert!(matches!(result, Err(ProvisioningError::IdBudget { .. })));
        }
    }

    #[test]
    fn test_fixed_contract_id() {
        assert_eq!(fixed_contract_id(&parent(), "7", 2).unwrap(), "ft7_2.bench.test");
        assert_eq!(fixed_contract_id(&parent(), "", 0).unwrap(), "ft_0.bench.test");
    }

    #[test]
    fn test_random_account_id() {
        let a = random_account_id(&parent(), "_ft").unwrap();
        let b = random_account_id(&parent(), "_ft").unwrap();
        assert_ne!(a, b);
        assert!(a.as_str().ends_with("_ft.bench.test"));
        assert_eq!(a.len(), RANDOM_NAME_LEN + "_ft.bench.test".len());
    }
}
