use utoipa::OpenApi;

/// OpenAPI Specification Documentation
///
/// Defines the API contract using OpenAPI 3.0 format with utoipa
/// procedural macros.
///
/// # Endpoints
/// - Health Check: `GET /api/v1/health`
/// - Email Validation: `GET /?email=...`
///
/// # Note
/// The OpenAPI spec is generated at compile time from these annotations.
/// Any changes to the API surface should be reflected here first to keep
/// the documentation accurate.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::email::validate_emails,
    ),
    components(
        schemas(
            crate::models::health::HealthResponse,
            crate::models::email::ValidationResult,
            crate::models::email::ValidationStatus,
            crate::models::email::CheckStage
        )
    ),
    tags(
        (name = "Health Check", description = "Service health monitoring endpoints"),
        (name = "Email Validation", description = "Email address validation endpoints")
    ),
    info(
        description = "Validates email addresses via syntax, DNS, SMTP reachability, and mailbox probing",
        title = "Email Validator API",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
