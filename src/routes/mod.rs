use actix_web::web;

/// # Health Check Endpoint
///
/// Service liveness probe under the versioned API scope.
pub mod health;

/// # Email Validation Endpoint
///
/// `GET /?email=a@x.com,b@y.com` runs the four-stage validation pipeline
/// for each comma-separated address and returns a JSON object keyed by
/// address.
pub mod email;

/// # API Route Configuration
///
/// Mounts the validation endpoint at the root and the health check under
/// `/api/v1`.
///
/// ```text
/// GET /                 - Email validation endpoint
/// GET /api/v1/health    - Service health status
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1").configure(health::configure_routes))
        .configure(email::configure_routes);
}
