//! Signed, time-bound identity tokens (HS256 JWT).
//!
//! Tokens are stateless: nothing is stored when one is issued, and a token
//! stays valid until its `exp` unless the signing secret changes.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::credentials::Account;
use crate::role::Role;

/// Verified caller, decoded from the token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u32,
    pub username: String,
    pub email: String,
    pub role: Role,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl TokenService {
    pub const DEFAULT_TTL_HOURS: i64 = 24;

    pub fn new(secret: &[u8], ttl: TimeDelta) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Lifetime as reported to clients, e.g. `"24h"`.
    pub fn expires_in(&self) -> String {
        if self.ttl.num_seconds() % 3600 == 0 {
            format!("{}h", self.ttl.num_hours())
        } else {
            format!("{}s", self.ttl.num_seconds())
        }
    }

    pub fn issue(&self, account: &Account) -> Result<IssuedToken, TokenError> {
        self.issue_at(account, Utc::now())
    }

    pub fn issue_at(
        &self,
        account: &Account,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.ttl;
        let claims = Identity {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        debug!(
            "Issuing token for {} ({}), expires at {}",
            claims.username, claims.role, expires_at
        );

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let decoded = decode::<Identity>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;

        // jsonwebtoken still accepts `exp == now`; a token is valid only before its expiry.
        if decoded.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        debug!("Verified token for {}", decoded.claims.username);
        Ok(decoded.claims)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(role: Role) -> Account {
        Account {
            id: 7,
            username: "tester".to_string(),
            email: "tester@company.com".to_string(),
            password_hash: "hash".to_string(),
            role,
        }
    }

    fn service() -> TokenService {
        TokenService::new(b"test-secret-key-12345", TimeDelta::hours(24))
    }

    #[test]
    fn issued_token_verifies_to_account_identity() {
        let service = service();
        let account = account(Role::HR);
        let issued = service.issue(&account).unwrap();
        let identity = service.verify(&issued.token).unwrap();

        assert_eq!(identity.id, account.id);
        assert_eq!(identity.username, account.username);
        assert_eq!(identity.email, account.email);
        assert_eq!(identity.role, account.role);
        assert_eq!(identity.exp - identity.iat, 24 * 3600);
        assert_eq!(identity.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn elapsed_token_is_expired() {
        let service = service();
        let issued = service
            .issue_at(&account(Role::ADMIN), Utc::now() - TimeDelta::hours(25))
            .unwrap();

        assert!(matches!(service.verify(&issued.token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_is_expired_at_its_expiry_second() {
        let service = TokenService::new(b"test-secret-key-12345", TimeDelta::hours(1));
        let issued = service
            .issue_at(&account(Role::HR), Utc::now() - TimeDelta::hours(1))
            .unwrap();

        assert!(issued.expires_at.timestamp() <= Utc::now().timestamp());
        assert!(matches!(service.verify(&issued.token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_one_minute_from_expiry_is_valid() {
        let service = TokenService::new(b"test-secret-key-12345", TimeDelta::hours(1));
        let issued = service
            .issue_at(&account(Role::HR), Utc::now() - TimeDelta::minutes(59))
            .unwrap();

        assert_eq!(service.verify(&issued.token).unwrap().username, "tester");
    }

    #[test]
    fn different_secret_is_rejected() {
        let issuer = service();
        let other = TokenService::new(b"another-secret", TimeDelta::hours(24));
        let issued = issuer.issue(&account(Role::ADMIN)).unwrap();

        assert!(matches!(other.verify(&issued.token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            service().verify("invalid.token.here"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn expires_in_formats_hours() {
        assert_eq!(service().expires_in(), "24h");
        let short = TokenService::new(b"s", TimeDelta::seconds(90));
        assert_eq!(short.expires_in(), "90s");
    }
}
