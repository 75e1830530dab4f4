//! Employee records behind bearer-token authentication.
//!
//! Accounts log in at `POST /api/auth/login` and receive a signed token.
//! Every employee route verifies that token; create, update and delete also
//! require the `admin` or `hr` role.

pub mod config;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod model;
pub mod repository;
pub mod response;
pub mod role;
pub mod routes;
pub mod state;
pub mod token;

use actix_web::middleware::Logger;
use actix_web::web;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiError;
use crate::model::{Employee, EmployeeUpdate, NewEmployee, Status};
use crate::repository::{EmployeeStats, PageInfo};
use crate::routes::{auth, employees, health};
use crate::state::AppState;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::verify,
        employees::list_employees,
        employees::employee_summary,
        employees::get_employee,
        employees::create_employee,
        employees::replace_employee,
        employees::patch_employee,
        employees::delete_employee,
        health::health
    ),
    components(schemas(
        Employee,
        NewEmployee,
        EmployeeUpdate,
        Status,
        EmployeeStats,
        PageInfo,
        auth::LoginRequest
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Login and token verification"),
        (name = "employees", description = "Employee API"),
        (name = "system", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// Registers the API under `/api` plus the Swagger UI.
pub fn configure(cfg: &mut web::ServiceConfig, state: web::Data<AppState>) {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::validation(err.to_string()).into());
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::validation(err.to_string()).into());

    cfg.app_data(state)
        .service(
            web::scope("/api")
                .app_data(json_config)
                .app_data(query_config)
                .service(auth::login)
                .service(auth::verify)
                .service(employees::list_employees)
                .service(employees::employee_summary)
                .service(employees::get_employee)
                .service(employees::create_employee)
                .service(employees::replace_employee)
                .service(employees::patch_employee)
                .service(employees::delete_employee)
                .service(health::health)
                .wrap(Logger::default()),
        )
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
        );
}
