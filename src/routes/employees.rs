use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::guard::EmployeeWriter;
use crate::model::{Employee, EmployeeUpdate, NewEmployee, Status};
use crate::repository::{EmployeeFilter, EmployeeStats, Pagination, RepositoryError};
use crate::response::{Actor, Envelope};
use crate::state::AppState;
use crate::token::Identity;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// One-based page number, default 1.
    pub page: Option<usize>,
    /// Page size, default 10.
    pub limit: Option<usize>,
    /// Case-insensitive department substring.
    pub department: Option<String>,
    /// Status to list, default `active`.
    pub status: Option<Status>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteQuery {
    /// `true` removes the record; anything else deactivates it.
    pub permanent: Option<String>,
}

/// Ids that do not parse are reported like unknown ids.
fn parse_id(raw: &str) -> Result<u32, ApiError> {
    raw.parse()
        .map_err(|_| RepositoryError::NotFound(raw.to_string()).into())
}

#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "employees",
    params(ListQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Page of employees", body = [Employee]),
        (status = 400, description = "Invalid paging parameters"),
        (status = 401, description = "Token missing")
    )
)]
#[get("/employees")]
pub async fn list_employees(
    identity: Identity,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let pagination = Pagination::new(
        query.page.unwrap_or(1),
        query.limit.unwrap_or(Pagination::DEFAULT_LIMIT),
    )
    .ok_or_else(|| ApiError::validation("page and limit must be positive integers"))?;
    let filter = EmployeeFilter {
        status: query.status.unwrap_or_default(),
        department: query.department.filter(|d| !d.is_empty()),
    };

    let page = state.employees()?.list(&filter, pagination);

    Ok(HttpResponse::Ok().json(
        Envelope::new(
            "Employees fetched successfully",
            page.employees,
            Actor::RequestedBy(identity.username),
        )
        .with_pagination(page.info),
    ))
}

#[utoipa::path(
    get,
    path = "/api/employees/stats/summary",
    tag = "employees",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Collection statistics", body = EmployeeStats),
        (status = 401, description = "Token missing")
    )
)]
#[get("/employees/stats/summary")]
pub async fn employee_summary(
    identity: Identity,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let stats = state.employees()?.summary();
    Ok(HttpResponse::Ok().json(Envelope::new(
        "Employee statistics fetched successfully",
        stats,
        Actor::RequestedBy(identity.username),
    )))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "employees",
    params(("id" = String, Path, description = "Employee id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    )
)]
#[get("/employees/{id}")]
pub async fn get_employee(
    identity: Identity,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&id)?;
    let employee = state.employees()?.get(id)?.clone();
    Ok(HttpResponse::Ok().json(Envelope::new(
        "Employee fetched successfully",
        employee,
        Actor::RequestedBy(identity.username),
    )))
}

#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "employees",
    request_body = NewEmployee,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Missing required fields"),
        (status = 403, description = "Role not allowed"),
        (status = 409, description = "Email already exists")
    )
)]
#[post("/employees")]
pub async fn create_employee(
    writer: EmployeeWriter,
    state: web::Data<AppState>,
    body: web::Json<NewEmployee>,
) -> Result<HttpResponse, ApiError> {
    let identity = writer.into_inner();

    let employee = state.employees_mut()?.create(body.into_inner(), Utc::now())?;
    info!(employee_id = employee.id, by = %identity.username, "Employee created");

    Ok(HttpResponse::Created().json(Envelope::new(
        "Employee created successfully",
        employee,
        Actor::CreatedBy(identity.username),
    )))
}

#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    tag = "employees",
    params(("id" = String, Path, description = "Employee id")),
    request_body = EmployeeUpdate,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Email already exists")
    )
)]
#[put("/employees/{id}")]
pub async fn replace_employee(
    writer: EmployeeWriter,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<EmployeeUpdate>,
) -> Result<HttpResponse, ApiError> {
    let identity = writer.into_inner();

    let id = parse_id(&id)?;
    let employee = state
        .employees_mut()?
        .replace(id, body.into_inner(), Utc::now())?;
    info!(employee_id = employee.id, by = %identity.username, "Employee updated");

    Ok(HttpResponse::Ok().json(Envelope::new(
        "Employee updated successfully",
        employee,
        Actor::UpdatedBy(identity.username),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/employees/{id}",
    tag = "employees",
    params(("id" = String, Path, description = "Employee id")),
    request_body = EmployeeUpdate,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "No valid fields to update"),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Email already exists")
    )
)]
#[patch("/employees/{id}")]
pub async fn patch_employee(
    writer: EmployeeWriter,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<EmployeeUpdate>,
) -> Result<HttpResponse, ApiError> {
    let identity = writer.into_inner();

    let id = parse_id(&id)?;
    let (employee, fields) = state
        .employees_mut()?
        .patch(id, body.into_inner(), Utc::now())?;
    info!(employee_id = employee.id, by = %identity.username, ?fields, "Employee patched");

    Ok(HttpResponse::Ok().json(
        Envelope::new(
            "Employee updated successfully",
            employee,
            Actor::UpdatedBy(identity.username),
        )
        .with_updated_fields(fields),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "employees",
    params(("id" = String, Path, description = "Employee id"), DeleteQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Employee deactivated or removed", body = Employee),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Employee not found")
    )
)]
#[delete("/employees/{id}")]
pub async fn delete_employee(
    writer: EmployeeWriter,
    state: web::Data<AppState>,
    id: web::Path<String>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse, ApiError> {
    let identity = writer.into_inner();

    let id = parse_id(&id)?;
    let permanent = query.permanent.as_deref() == Some("true");
    let employee = state.employees_mut()?.delete(id, permanent, Utc::now())?;
    info!(employee_id = employee.id, by = %identity.username, permanent, "Employee deleted");

    let message = if permanent {
        "Employee deleted successfully"
    } else {
        "Employee deactivated (soft delete)"
    };
    Ok(HttpResponse::Ok().json(
        Envelope::new(message, employee, Actor::DeletedBy(identity.username))
            .with_permanent(permanent),
    ))
}
