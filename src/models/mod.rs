pub mod email;
pub mod health;

pub use email::{CheckStage, EmailAddress, ValidationResult, ValidationStatus};
pub use health::HealthResponse;
