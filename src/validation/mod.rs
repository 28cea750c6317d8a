//! The validation pipeline: Syntax → Domain → SmtpConnect → MailboxExists.
//!
//! Stages run in strict order and the pipeline stops at the first failing
//! stage. Every network or parsing fault is converted into a
//! [`ValidationResult`]; nothing escapes [`Validator::validate`] as an
//! error.

pub mod domain;
pub mod smtp;
pub mod syntax;

use std::sync::Arc;

use futures::{StreamExt, stream};

use crate::config::ValidatorConfig;
use crate::models::{CheckStage, EmailAddress, ValidationResult};
use domain::ResolveDomain;
use smtp::MailboxVerdict;

/// Stateless validation service. Holds only configuration and the resolver
/// seam; every call to [`validate`](Self::validate) is independent, which
/// is what makes the batch fan-out in
/// [`validate_many`](Self::validate_many) safe.
pub struct Validator {
    config: ValidatorConfig,
    resolver: Arc<dyn ResolveDomain>,
}

impl Validator {
    pub fn new(config: ValidatorConfig, resolver: Arc<dyn ResolveDomain>) -> Self {
        Self { config, resolver }
    }

    /// Runs the full pipeline for one address.
    ///
    /// Stage messages are stable and user-visible:
    /// - `Syntax` failure: "Syntax error"
    /// - `Domain` failure: "Domain does not exist"
    /// - `SmtpConnect` failure: "SMTP server rejected the email"
    /// - `MailboxExists` failure: "Mailbox does not exist"
    /// - success: "Email passed all checks"
    ///
    /// An inconclusive mailbox probe (greylisting, timeout, dropped
    /// connection) yields an `indeterminate` result rather than being
    /// counted as either valid or invalid.
    pub async fn validate(&self, address: &str) -> ValidationResult {
        if !syntax::is_valid_email(address) {
            return ValidationResult::invalid(address, CheckStage::Syntax, "Syntax error");
        }

        // Syntax passed, so the split cannot fail.
        let Some(parsed) = EmailAddress::parse(address) else {
            return ValidationResult::invalid(address, CheckStage::Syntax, "Syntax error");
        };

        if !self.resolver.has_records(&parsed.domain).await {
            return ValidationResult::invalid(
                address,
                CheckStage::Domain,
                "Domain does not exist",
            );
        }

        if let Err(err) = smtp::probe_server(&parsed.domain, &self.config).await {
            log::debug!("SMTP probe for {address} failed: {err}");
            return ValidationResult::invalid(
                address,
                CheckStage::SmtpConnect,
                "SMTP server rejected the email",
            );
        }

        match smtp::probe_mailbox(&parsed, &self.config).await {
            MailboxVerdict::Exists => {
                ValidationResult::valid(address, "Email passed all checks")
            }
            MailboxVerdict::NotFound => ValidationResult::invalid(
                address,
                CheckStage::MailboxExists,
                "Mailbox does not exist",
            ),
            MailboxVerdict::Indeterminate(reason) => ValidationResult::indeterminate(
                address,
                &format!("Mailbox existence could not be determined: {reason}"),
            ),
        }
    }

    /// Validates a batch of addresses concurrently, bounded by the
    /// configured concurrency limit. Each address still runs its own
    /// stages sequentially, and results come back in input order.
    pub async fn validate_many(&self, addresses: &[String]) -> Vec<ValidationResult> {
        stream::iter(addresses)
            .map(|address| self.validate(address))
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await
    }
}
