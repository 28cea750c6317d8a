/// Validates an email address against the service's permissive pattern.
///
/// The accepted shape is one or more characters from `[A-Za-z0-9_.+-]`,
/// an `@`, then a domain of non-empty labels from `[A-Za-z0-9-]` separated
/// by dots, with at least one dot.
///
/// This is deliberately *not* full RFC 5322: quoted local parts, comments,
/// and IP-literal domains (`user@[192.168.0.1]`) are all rejected. That is
/// a documented limitation of the check, not an oversight.
///
/// # Examples
/// ```
/// use email_validator::validation::syntax::is_valid_email;
///
/// assert!(is_valid_email("user.name+tag@example.com"));
/// assert!(!is_valid_email("not-an-email"));
/// assert!(!is_valid_email("user@nodots"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || !local.chars().all(is_local_char) {
        return false;
    }

    is_valid_domain(domain)
}

fn is_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-')
}

/// A domain is valid when it has at least two labels and every label is a
/// non-empty run of `[A-Za-z0-9-]`.
fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}
