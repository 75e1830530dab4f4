//! Start-up configuration, read from the Shuttle secret store.
//!
//! | key               | default                    |
//! |-------------------|----------------------------|
//! | `JWT_SECRET`      | development fallback       |
//! | `TOKEN_TTL_HOURS` | 24                         |
//! | `BCRYPT_COST`     | `bcrypt::DEFAULT_COST`     |

use shuttle_runtime::SecretStore;
use thiserror::Error;
use tracing::warn;

use crate::token::TokenService;

const DEV_JWT_SECRET: &str = "your-secret-key-2024";

/// Accepted `BCRYPT_COST` range; bcrypt does not export its own bounds.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: TokenService::DEFAULT_TTL_HOURS,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AppConfig {
    pub fn from_secrets(secrets: &SecretStore) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| secrets.get(key))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET is not set, using the development secret");
                defaults.jwt_secret
            }
        };

        let token_ttl_hours = match lookup("TOKEN_TTL_HOURS") {
            Some(value) => value
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|hours| (1..=24 * 365).contains(hours))
                .ok_or(ConfigError::Invalid {
                    key: "TOKEN_TTL_HOURS",
                    expected: "a number of hours between 1 and 8760",
                    value,
                })?,
            None => defaults.token_ttl_hours,
        };

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|cost| (MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(cost))
                .ok_or(ConfigError::Invalid {
                    key: "BCRYPT_COST",
                    expected: "a bcrypt cost between 4 and 31",
                    value,
                })?,
            None => defaults.bcrypt_cost,
        };

        Ok(Self {
            jwt_secret,
            token_ttl_hours,
            bcrypt_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.token_ttl_hours, 24);
    }

    #[test]
    fn reads_all_keys() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("TOKEN_TTL_HOURS", "2"),
            ("BCRYPT_COST", "6"),
        ]))
        .unwrap();
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.token_ttl_hours, 2);
        assert_eq!(config.bcrypt_cost, 6);
    }

    #[test]
    fn rejects_bad_values() {
        let err = AppConfig::from_lookup(lookup(&[("TOKEN_TTL_HOURS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TOKEN_TTL_HOURS", .. }));

        let err = AppConfig::from_lookup(lookup(&[("BCRYPT_COST", "fast")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BCRYPT_COST", .. }));

        let err = AppConfig::from_lookup(lookup(&[("BCRYPT_COST", "3")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BCRYPT_COST", .. }));

        let err = AppConfig::from_lookup(lookup(&[("BCRYPT_COST", "32")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BCRYPT_COST", .. }));
    }

    #[test]
    fn accepts_cost_bounds() {
        for cost in [MIN_BCRYPT_COST, MAX_BCRYPT_COST] {
            let value = cost.to_string();
            let config =
                AppConfig::from_lookup(lookup(&[("BCRYPT_COST", value.as_str())])).unwrap();
            assert_eq!(config.bcrypt_cost, cost);
        }
    }
}
