use actix_web::{HttpResponse, get};
use chrono::Utc;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses((status = 200, description = "Service is up"))
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "message": "Employee API is running",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/api/auth/login",
            "employees": "/api/employees",
            "stats": "/api/employees/stats/summary",
        },
    }))
}
