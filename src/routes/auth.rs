use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::role::Role;
use crate::state::AppState;
use crate::token::Identity;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: Option<String>,
    #[schema(example = "admin123")]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
struct UserSummary {
    id: u32,
    username: String,
    email: String,
    role: Role,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    success: bool,
    message: &'static str,
    token: String,
    #[serde(rename = "tokenType")]
    token_type: &'static str,
    #[serde(rename = "expiresIn")]
    expires_in: String,
    user: UserSummary,
}

#[derive(Debug, Serialize)]
struct VerifyResponse {
    valid: bool,
    user: Identity,
    message: &'static str,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token issued"),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials")
    )
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let LoginRequest { username, password } = body.into_inner();
    let (Some(username), Some(password)) = (
        username.filter(|u| !u.is_empty()),
        password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::validation("Username and password required"));
    };

    info!("Login attempt for {username}");

    // bcrypt verification blocks, run it on the blocking pool.
    let lookup_state = state.clone();
    let lookup_name = username.clone();
    let account = web::block(move || {
        lookup_state
            .credentials()
            .authenticate(&lookup_name, &password)
            .map(|account| account.cloned())
    })
    .await
    .map_err(|e| ApiError::internal(e.to_string()))??;

    let Some(account) = account else {
        warn!("Rejected credentials for {username}");
        return Err(ApiError::InvalidCredentials);
    };

    let issued = state.tokens().issue(&account)?;
    info!("Login successful for {}", account.username);

    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        message: "Login successful",
        token: issued.token,
        token_type: "Bearer",
        expires_in: state.tokens().expires_in(),
        user: UserSummary {
            id: account.id,
            username: account.username,
            email: account.email,
            role: account.role,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/verify",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Token missing"),
        (status = 403, description = "Token invalid or expired")
    )
)]
#[get("/auth/verify")]
pub async fn verify(identity: Identity) -> HttpResponse {
    HttpResponse::Ok().json(VerifyResponse {
        valid: true,
        user: identity,
        message: "Token is valid",
    })
}
