use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An email address split into its local part and domain.
///
/// The split happens at the *first* `@`. Construction is only attempted
/// after the syntax check has passed, so both halves are guaranteed
/// non-empty for addresses flowing through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress {
    pub raw: String,
    pub local: String,
    pub domain: String,
}

impl EmailAddress {
    /// Splits `raw` at the first `@`. Returns `None` when there is no `@`
    /// or either side is empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let (local, domain) = raw.split_once('@')?;
        if local.is_empty() || domain.is_empty() {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            local: local.to_string(),
            domain: domain.to_string(),
        })
    }
}

/// Identifies which pipeline stage produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CheckStage {
    Syntax,
    Domain,
    SmtpConnect,
    MailboxExists,
}

/// Outcome of a full validation run for one address.
///
/// `Indeterminate` covers mailbox probes that neither accepted nor
/// permanently rejected the recipient (greylisting, timeouts, dropped
/// connections). Collapsing those into either extreme would misreport
/// what the remote server actually said.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    Indeterminate,
}

/// Per-address validation result, immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationResult {
    pub address: String,
    pub status: ValidationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<CheckStage>,
    pub message: String,
}

impl ValidationResult {
    pub fn valid(address: &str, message: &str) -> Self {
        Self {
            address: address.to_string(),
            status: ValidationStatus::Valid,
            failed_stage: None,
            message: message.to_string(),
        }
    }

    pub fn invalid(address: &str, stage: CheckStage, message: &str) -> Self {
        Self {
            address: address.to_string(),
            status: ValidationStatus::Invalid,
            failed_stage: Some(stage),
            message: message.to_string(),
        }
    }

    pub fn indeterminate(address: &str, message: &str) -> Self {
        Self {
            address: address.to_string(),
            status: ValidationStatus::Indeterminate,
            failed_stage: Some(CheckStage::MailboxExists),
            message: message.to_string(),
        }
    }
}
