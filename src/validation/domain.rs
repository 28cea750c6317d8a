use std::time::Duration;

use async_trait::async_trait;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
};

/// Seam between the pipeline and the system resolver, so tests can
/// substitute a scripted implementation.
#[async_trait]
pub trait ResolveDomain: Send + Sync {
    /// Returns `true` when the domain resolves to at least one address.
    /// Resolution failures of any kind (NXDOMAIN, SERVFAIL, timeout) are
    /// reported as `false`; distinguishing them is not this service's job.
    async fn has_records(&self, domain: &str) -> bool;
}

/// Production resolver backed by trust-dns with a bounded per-request
/// timeout and capped attempts. An unresponsive upstream resolver must not
/// hang a validation, so the timeout is mandatory rather than best-effort.
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    pub fn new(timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 2;

        Self {
            inner: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }
}

#[async_trait]
impl ResolveDomain for SystemResolver {
    async fn has_records(&self, domain: &str) -> bool {
        match self.inner.lookup_ip(domain).await {
            Ok(lookup) => lookup.iter().next().is_some(),
            Err(_) => false,
        }
    }
}

/// Scripted resolver for tests: answers every lookup the same way, after an
/// optional artificial delay (used to prove batch concurrency).
#[cfg(test)]
pub struct StaticResolver {
    pub answer: bool,
    pub delay: Option<Duration>,
}

#[cfg(test)]
#[async_trait]
impl ResolveDomain for StaticResolver {
    async fn has_records(&self, _domain: &str) -> bool {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer
    }
}
