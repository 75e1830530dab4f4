//! Fixed set of login accounts.
//!
//! Passwords are bcrypt-hashed when the store is built and only the hash is
//! kept; login compares through `bcrypt::verify`.

use bcrypt::{BcryptError, hash, verify};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::role::Role;

#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: u32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

/// Plaintext account definition, hashed on the way into the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: u32,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl NewAccount {
    pub fn new(id: u32, username: &str, email: &str, password: &str, role: Role) -> Self {
        Self {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
        }
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("username {0} is already taken")]
    DuplicateUsername(String),

    #[error("password hashing failed: {0}")]
    Hash(#[from] BcryptError),
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    accounts: Vec<Account>,
}

impl CredentialStore {
    pub fn with_accounts(
        cost: u32,
        accounts: impl IntoIterator<Item = NewAccount>,
    ) -> Result<Self, CredentialError> {
        let mut stored: Vec<Account> = Vec::new();
        for account in accounts {
            if stored.iter().any(|a| a.username == account.username) {
                return Err(CredentialError::DuplicateUsername(account.username));
            }
            stored.push(Account {
                id: account.id,
                username: account.username,
                email: account.email,
                password_hash: hash(&account.password, cost)?,
                role: account.role,
            });
        }
        debug!("Credential store ready with {} accounts", stored.len());
        Ok(Self { accounts: stored })
    }

    /// The built-in `admin` and `hr_manager` accounts.
    pub fn seeded(cost: u32) -> Result<Self, CredentialError> {
        Self::with_accounts(
            cost,
            [
                NewAccount::new(1, "admin", "admin@company.com", "admin123", Role::ADMIN),
                NewAccount::new(2, "hr_manager", "hr@company.com", "hr123", Role::HR),
            ],
        )
    }

    pub fn find(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    /// `Ok(None)` for an unknown user or a wrong password.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<&Account>, CredentialError> {
        let Some(account) = self.find(username) else {
            return Ok(None);
        };
        if verify(password, &account.password_hash)? {
            Ok(Some(account))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_BCRYPT_COST;

    fn store() -> CredentialStore {
        CredentialStore::seeded(MIN_BCRYPT_COST).unwrap()
    }

    #[test]
    fn authenticates_seed_accounts() {
        let store = store();
        let admin = store.authenticate("admin", "admin123").unwrap().unwrap();
        assert_eq!(admin.id, 1);
        assert_eq!(admin.role, Role::ADMIN);

        let hr = store.authenticate("hr_manager", "hr123").unwrap().unwrap();
        assert_eq!(hr.email, "hr@company.com");
        assert_eq!(hr.role, Role::HR);
    }

    #[test]
    fn rejects_wrong_password_and_unknown_user() {
        let store = store();
        assert!(store.authenticate("admin", "hr123").unwrap().is_none());
        assert!(store.authenticate("nobody", "admin123").unwrap().is_none());
    }

    #[test]
    fn stores_only_hashes() {
        let store = store();
        let admin = store.find("admin").unwrap();
        assert_ne!(admin.password_hash, "admin123");

        let json = serde_json::to_value(admin).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn duplicate_usernames_are_rejected() {
        let result = CredentialStore::with_accounts(
            MIN_BCRYPT_COST,
            [
                NewAccount::new(1, "admin", "a@company.com", "x", Role::ADMIN),
                NewAccount::new(2, "admin", "b@company.com", "y", Role::HR),
            ],
        );
        assert!(matches!(result, Err(CredentialError::DuplicateUsername(name)) if name == "admin"));
    }
}
