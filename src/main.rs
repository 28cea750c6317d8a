use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web::Data};
use email_validator::config::AppConfig;
use email_validator::openapi::ApiDoc;
use email_validator::validation::{Validator, domain::SystemResolver};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Email Validator Service Entry Point
///
/// Configures and launches the Actix-web HTTP server with:
/// - The validation endpoint at `/` and health check at `/api/v1/health`
/// - Swagger UI for API documentation
/// - Environment configuration via `.env` file
///
/// # Endpoints
/// - Validation: `GET /?email=a@x.com,b@y.com`
/// - Health: `GET /api/v1/health`
/// - Swagger UI: `/swagger-ui/`
/// - OpenAPI spec: `/api-docs/openapi.json`
///
/// # Configuration
/// - Binds to `127.0.0.1:8080` by default; see [`AppConfig`] for the
///   environment variables that override listen address, SMTP port, and
///   per-stage timeouts.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();
    log::info!(
        "starting email validator on {}:{} (SMTP port {})",
        config.bind_addr,
        config.port,
        config.validator.smtp_port
    );

    let resolver = Arc::new(SystemResolver::new(config.validator.dns_timeout));
    let validator = Data::new(Validator::new(config.validator.clone(), resolver));

    HttpServer::new(move || {
        let openapi = ApiDoc::openapi();

        App::new()
            .wrap(Logger::default())
            .app_data(validator.clone())
            .configure(email_validator::routes::configure)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
