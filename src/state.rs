use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::TimeDelta;

use crate::config::AppConfig;
use crate::credentials::{CredentialError, CredentialStore};
use crate::error::ApiError;
use crate::repository::EmployeeRepository;
use crate::token::TokenService;

/// Shared application state. Handlers hold the repository lock for the
/// whole of each operation, so check-then-write sequences cannot interleave.
#[derive(Debug)]
pub struct AppState {
    tokens: TokenService,
    credentials: CredentialStore,
    employees: RwLock<EmployeeRepository>,
}

impl AppState {
    pub fn new(
        tokens: TokenService,
        credentials: CredentialStore,
        employees: EmployeeRepository,
    ) -> Self {
        Self {
            tokens,
            credentials,
            employees: RwLock::new(employees),
        }
    }

    /// Seed accounts and employees, keyed and hashed per `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, CredentialError> {
        let tokens = TokenService::new(
            config.jwt_secret.as_bytes(),
            TimeDelta::hours(config.token_ttl_hours),
        );
        let credentials = CredentialStore::seeded(config.bcrypt_cost)?;
        Ok(Self::new(tokens, credentials, EmployeeRepository::seeded()))
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn employees(&self) -> Result<RwLockReadGuard<'_, EmployeeRepository>, ApiError> {
        self.employees
            .read()
            .map_err(|_| ApiError::internal("employee repository lock poisoned"))
    }

    pub fn employees_mut(&self) -> Result<RwLockWriteGuard<'_, EmployeeRepository>, ApiError> {
        self.employees
            .write()
            .map_err(|_| ApiError::internal("employee repository lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::Utc;

    use super::*;
    use crate::config::MIN_BCRYPT_COST;
    use crate::credentials::NewAccount;
    use crate::model::{Employee, NewEmployee};
    use crate::repository::RepositoryError;

    const WORKERS: usize = 8;

    fn shared_state() -> Arc<AppState> {
        let credentials =
            CredentialStore::with_accounts(MIN_BCRYPT_COST, Vec::<NewAccount>::new()).unwrap();
        Arc::new(AppState::new(
            TokenService::new(b"test-secret", TimeDelta::hours(1)),
            credentials,
            EmployeeRepository::seeded(),
        ))
    }

    fn hire(email: String) -> NewEmployee {
        NewEmployee {
            first_name: Some("Sam".to_string()),
            last_name: Some("Taylor".to_string()),
            email: Some(email),
            department: Some("Support".to_string()),
            position: Some("Agent".to_string()),
            ..NewEmployee::default()
        }
    }

    fn create_on_threads(
        state: &Arc<AppState>,
        email: impl Fn(usize) -> String,
    ) -> Vec<Result<Employee, RepositoryError>> {
        let handles: Vec<_> = (0..WORKERS)
            .map(|n| {
                let state = Arc::clone(state);
                let new = hire(email(n));
                thread::spawn(move || state.employees_mut().unwrap().create(new, Utc::now()))
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    }

    #[test]
    fn concurrent_creates_with_one_email_admit_a_single_record() {
        let state = shared_state();
        let results = create_on_threads(&state, |_| "sam.taylor@company.com".to_string());

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(RepositoryError::DuplicateEmail(_))))
                .count(),
            WORKERS - 1
        );
        assert_eq!(state.employees().unwrap().len(), 4);
    }

    #[test]
    fn concurrent_creates_get_distinct_contiguous_ids() {
        let state = shared_state();
        let results = create_on_threads(&state, |n| format!("worker{n}@company.com"));

        let mut ids: Vec<u32> = results.into_iter().map(|r| r.unwrap().id).collect();
        ids.sort_unstable();
        let expected: Vec<u32> = (4..4 + WORKERS as u32).collect();
        assert_eq!(ids, expected);
        assert_eq!(state.employees().unwrap().len(), 3 + WORKERS);
    }
}
