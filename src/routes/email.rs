use actix_web::{HttpResponse, Responder, get, web};
use serde::Deserialize;
use serde_json::json;

use crate::validation::Validator;

#[derive(Deserialize)]
pub struct ValidateQuery {
    email: Option<String>,
}

/// # Email Validation Endpoint
///
/// Validates one or more email addresses through a layered pipeline:
/// 1. Syntax check (permissive pattern, no I/O)
/// 2. Domain existence check (DNS resolution)
/// 3. SMTP server reachability (greeting handshake on port 25)
/// 4. Mailbox existence probe (`MAIL FROM:<>` / `RCPT TO`)
///
/// ## Request
/// - Method: GET
/// - Query parameter `email`: one or more comma-separated addresses
///
/// ## Responses
/// - **200 OK**: JSON object mapping each requested address to
///   `{"status": "valid"|"invalid"|"indeterminate", "message": "..."}`.
///   Per-address failures never change the response status; every address
///   gets its own entry.
/// - **400 Bad Request**: the `email` parameter is missing or empty
///
/// ## Example
/// ```text
/// GET /?email=user@example.com,not-an-email
/// ```
/// ```json
/// {
///   "user@example.com": { "status": "valid", "message": "Email passed all checks" },
///   "not-an-email": { "status": "invalid", "message": "Syntax error" }
/// }
/// ```
#[utoipa::path(
    get,
    path = "/",
    params(
        ("email" = String, Query, description = "Comma-separated list of email addresses to validate")
    ),
    responses(
        (status = 200, description = "Per-address validation results keyed by address"),
        (status = 400, description = "Missing or empty email parameter")
    ),
    tag = "Email Validation"
)]
#[get("/")]
pub async fn validate_emails(
    query: web::Query<ValidateQuery>,
    validator: web::Data<Validator>,
) -> impl Responder {
    let addresses: Vec<String> = query
        .email
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if addresses.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "MISSING_EMAIL",
            "message": "Query parameter 'email' must contain at least one address"
        }));
    }

    let results = validator.validate_many(&addresses).await;

    let mut body = serde_json::Map::new();
    for result in results {
        body.insert(
            result.address.clone(),
            json!({
                "status": result.status,
                "message": result.message,
            }),
        );
    }
    HttpResponse::Ok().json(serde_json::Value::Object(body))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(validate_emails);
}
