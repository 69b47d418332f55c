//! On-chain account identities and the key material that goes with them.

use std::{fmt, str::FromStr};

use derive_more::Display;
use ed25519_dalek::SigningKey;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::AccountIdError;

/// Longest account identity the target chain accepts.
pub const MAX_ACCOUNT_ID_LEN: usize = 64;

/// Shortest account identity the target chain accepts.
pub const MIN_ACCOUNT_ID_LEN: usize = 2;

/// A validated, dot-namespaced account identity such as `alice.bench.test`.
///
/// Identities are lowercase alphanumerics split into parts by `.`; inside a part `-` and `_`
/// may separate alphanumeric runs.
#[derive(Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[display("{_0}")]
pub struct AccountId(String);

impl AccountId {
    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the identity's length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; a valid identity is never empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the identity of `prefix` nested directly under `self`.
    pub fn sub_account(&self, prefix: &str) -> Result<Self, AccountIdError> {
        format!("{prefix}.{}", self.0).parse()
    }

    fn validate(id: &str) -> Result<(), AccountIdError> {
        if id.len() < MIN_ACCOUNT_ID_LEN {
            return Err(AccountIdError::TooShort(id.to_string()));
        }
        if id.len() > MAX_ACCOUNT_ID_LEN {
            return Err(AccountIdError::TooLong { id: id.to_string(), max: MAX_ACCOUNT_ID_LEN });
        }

        let mut last_was_separator = true;
        for (pos, c) in id.chars().enumerate() {
            match c {
                'a'..='z' | '0'..='9' => last_was_separator = false,
                '-' | '_' | '.' => {
                    if last_was_separator {
                        return Err(AccountIdError::RedundantSeparator { id: id.to_string(), pos });
                    }
                    last_was_separator = true;
                }
                _ => return Err(AccountIdError::InvalidChar { id: id.to_string(), ch: c, pos }),
            }
        }
        if last_was_separator {
            return Err(AccountIdError::RedundantSeparator { id: id.to_string(), pos: id.len() - 1 });
        }

        Ok(())
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::validate(&value)?;
        Ok(Self(value))
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for AccountId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for AccountId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Ed25519 key material for an account.
#[derive(Clone)]
pub struct AccountKey {
    signing_key: SigningKey,
}

impl fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountKey").field("public_key", &self.public_key_hex()).finish()
    }
}

impl AccountKey {
    /// Derives a key deterministically from `seed`.
    ///
    /// Test networks only: anyone who knows the seed can sign for the account.
    pub fn from_seed(seed: &str) -> Self {
        let digest: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
        Self { signing_key: SigningKey::from_bytes(&digest) }
    }

    /// Generates a fresh random key.
    pub fn random() -> Self {
        let mut secret = [0u8; 32];
        rand::rng().fill(&mut secret);
        Self { signing_key: SigningKey::from_bytes(&secret) }
    }

    /// Returns the hex encoded public key.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().as_bytes())
    }
}

impl PartialEq for AccountKey {
    fn eq(&self, other: &Self) -> bool {
        self.signing_key.verifying_key() == other.signing_key.verifying_key()
    }
}

impl Eq for AccountKey {}

/// An account identity together with the key able to sign for it.
///
/// Active accounts sign transactions during the test. Passive accounts only ever receive
/// transfers; their key exists on-chain but is never used to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// The on-chain identity.
    pub id: AccountId,
    /// Key material for the identity.
    pub key: AccountKey,
}

impl Account {
    /// Creates an account whose key is seeded from its own identity.
    pub fn from_seed(id: AccountId) -> Self {
        let key = AccountKey::from_seed(id.as_str());
        Self { id, key }
    }

    /// Creates an account with a random key.
    pub fn random(id: AccountId) -> Self {
        Self { id, key: AccountKey::random() }
    }
}
