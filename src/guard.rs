//! Request authentication and role checks.
//!
//! Taking an [`Identity`] argument in a handler runs bearer-token
//! verification before the handler body. Mutating handlers take an
//! [`EmployeeWriter`] as their first argument instead, so the role check
//! also runs before the request body is decoded.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, web};
use tracing::warn;

use crate::error::ApiError;
use crate::role::Role;
use crate::state::AppState;
use crate::token::Identity;

/// Roles allowed to create, update and delete employees.
pub const EMPLOYEE_WRITERS: [Role; 2] = [Role::ADMIN, Role::HR];

pub fn require_role(identity: &Identity, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&identity.role) {
        return Ok(());
    }
    warn!(
        "Denied {} (role {}): requires one of {:?}",
        identity.username, identity.role, allowed
    );
    Err(ApiError::Forbidden {
        role: identity.role.clone(),
        required: allowed.to_vec(),
    })
}

/// Token from `Authorization: Bearer <token>`, if the header is well formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

fn authenticate(req: &HttpRequest) -> Result<Identity, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::internal("application state is not configured"))?;

    let Some(token) = bearer_token(req.headers()) else {
        warn!("Missing bearer token for {}", req.path());
        return Err(ApiError::Unauthenticated);
    };

    state.tokens().verify(token).map_err(|e| {
        warn!("Token rejected for {}: {}", req.path(), e);
        ApiError::from(e)
    })
}

impl FromRequest for Identity {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Authenticated caller holding one of [`EMPLOYEE_WRITERS`].
#[derive(Debug, Clone)]
pub struct EmployeeWriter(Identity);

impl EmployeeWriter {
    pub fn into_inner(self) -> Identity {
        self.0
    }
}

impl FromRequest for EmployeeWriter {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|identity| {
            require_role(&identity, &EMPLOYEE_WRITERS)?;
            Ok(Self(identity))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use chrono::TimeDelta;

    use crate::config::MIN_BCRYPT_COST;
    use crate::credentials::{Account, CredentialStore, NewAccount};
    use crate::repository::EmployeeRepository;
    use crate::token::TokenService;

    fn identity(role: Role) -> Identity {
        Identity {
            id: 1,
            username: "someone".to_string(),
            email: "someone@company.com".to_string(),
            role,
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn writers_pass_the_guard() {
        assert!(require_role(&identity(Role::ADMIN), &EMPLOYEE_WRITERS).is_ok());
        assert!(require_role(&identity(Role::HR), &EMPLOYEE_WRITERS).is_ok());
    }

    #[test]
    fn other_roles_are_forbidden_with_their_role() {
        let err = require_role(&identity(Role::new("viewer")), &EMPLOYEE_WRITERS).unwrap_err();
        match err {
            ApiError::Forbidden { role, required } => {
                assert_eq!(role, Role::new("viewer"));
                assert_eq!(required, EMPLOYEE_WRITERS.to_vec());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    fn test_state() -> web::Data<AppState> {
        web::Data::new(AppState::new(
            TokenService::new(b"test-secret", TimeDelta::hours(1)),
            CredentialStore::with_accounts(MIN_BCRYPT_COST, Vec::<NewAccount>::new()).unwrap(),
            EmployeeRepository::default(),
        ))
    }

    fn request_with_role(role: Role) -> HttpRequest {
        let state = test_state();
        let account = Account {
            id: 9,
            username: "someone".to_string(),
            email: "someone@company.com".to_string(),
            password_hash: String::new(),
            role,
        };
        let token = state.tokens().issue(&account).unwrap().token;
        TestRequest::default()
            .app_data(state)
            .insert_header((AUTHORIZATION, format!("Bearer {token}")))
            .to_http_request()
    }

    #[actix_web::test]
    async fn writer_extractor_admits_writers_only() {
        let req = request_with_role(Role::HR);
        let writer = EmployeeWriter::extract(&req).await.unwrap();
        assert_eq!(writer.into_inner().role, Role::HR);

        let req = request_with_role(Role::new("viewer"));
        let err = EmployeeWriter::extract(&req).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden { .. }));
    }

    #[actix_web::test]
    async fn writer_extractor_requires_a_token() {
        let req = TestRequest::default().app_data(test_state()).to_http_request();
        let err = EmployeeWriter::extract(&req).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[test]
    fn bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(req.headers()), Some("abc.def.ghi"));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic abc"))
            .to_http_request();
        assert_eq!(bearer_token(req.headers()), None);

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer   "))
            .to_http_request();
        assert_eq!(bearer_token(req.headers()), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(req.headers()), None);
    }
}
