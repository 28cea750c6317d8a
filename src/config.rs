use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Process-wide configuration, read once at startup.
///
/// Every value comes from an environment variable (loaded from `.env` if
/// present) and falls back to a default, so the service runs with no
/// configuration at all.
///
/// | Variable | Default |
/// |---|---|
/// | `BIND_ADDR` | `127.0.0.1` |
/// | `PORT` | `8080` |
/// | `SMTP_PORT` | `25` |
/// | `HELO_DOMAIN` | `localhost` |
/// | `DNS_TIMEOUT_MS` | `2000` |
/// | `SMTP_CONNECT_TIMEOUT_MS` | `5000` |
/// | `SMTP_IO_TIMEOUT_MS` | `5000` |
/// | `MAX_CONCURRENT_VALIDATIONS` | `8` |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub validator: ValidatorConfig,
}

/// Knobs for the validation pipeline itself: outbound SMTP port, HELO name,
/// per-stage timeouts, and the batch concurrency bound.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub smtp_port: u16,
    pub helo_domain: String,
    pub dns_timeout: Duration,
    pub connect_timeout: Duration,
    pub io_timeout: Duration,
    pub max_concurrency: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            smtp_port: 25,
            helo_domain: "localhost".to_string(),
            dns_timeout: Duration::from_millis(2_000),
            connect_timeout: Duration::from_millis(5_000),
            io_timeout: Duration::from_millis(5_000),
            max_concurrency: 8,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = ValidatorConfig::default();
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            validator: ValidatorConfig {
                smtp_port: parse_var("SMTP_PORT", defaults.smtp_port),
                helo_domain: env::var("HELO_DOMAIN")
                    .unwrap_or_else(|_| defaults.helo_domain.clone()),
                dns_timeout: Duration::from_millis(parse_var("DNS_TIMEOUT_MS", 2_000)),
                connect_timeout: Duration::from_millis(parse_var(
                    "SMTP_CONNECT_TIMEOUT_MS",
                    5_000,
                )),
                io_timeout: Duration::from_millis(parse_var("SMTP_IO_TIMEOUT_MS", 5_000)),
                max_concurrency: parse_var("MAX_CONCURRENT_VALIDATIONS", defaults.max_concurrency),
            },
        }
    }
}

/// Reads an environment variable, falling back to `default` when the
/// variable is unset or fails to parse.
fn parse_var<T: FromStr + Copy>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_defaults() {
        let cfg = ValidatorConfig::default();
        assert_eq!(cfg.smtp_port, 25);
        assert_eq!(cfg.helo_domain, "localhost");
        assert_eq!(cfg.dns_timeout, Duration::from_millis(2_000));
        assert_eq!(cfg.connect_timeout, Duration::from_millis(5_000));
        assert_eq!(cfg.io_timeout, Duration::from_millis(5_000));
        assert_eq!(cfg.max_concurrency, 8);
    }

    #[test]
    fn parse_var_uses_default_when_unset() {
        assert_eq!(parse_var::<u16>("EMAIL_VALIDATOR_TEST_UNSET", 4242), 4242);
    }

    #[test]
    fn parse_var_uses_default_on_garbage() {
        // Variable names are unique per test to stay safe under the
        // parallel test runner.
        unsafe { env::set_var("EMAIL_VALIDATOR_TEST_GARBAGE", "not-a-number") };
        assert_eq!(parse_var::<u16>("EMAIL_VALIDATOR_TEST_GARBAGE", 7), 7);
    }

    #[test]
    fn parse_var_reads_value() {
        unsafe { env::set_var("EMAIL_VALIDATOR_TEST_PORT", "2525") };
        assert_eq!(parse_var::<u16>("EMAIL_VALIDATOR_TEST_PORT", 25), 2525);
    }
}
