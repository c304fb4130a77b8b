//! Normalization of user-entered domain input.
//!
//! Users paste anything: bare domains, full URLs, uppercase, trailing
//! paths. The backend wants a bare lowercase domain, so everything is
//! reduced to that shape before submission and rejected early when it
//! cannot be.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ApiError;

static DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-z0-9-]+\.)+[a-z]{2,}$").expect("domain pattern compiles"));

/// Reduce raw input to a bare lowercase domain.
///
/// Accepts `acme.io`, `https://www.acme.io/pricing`, `ACME.IO`, and the
/// like. A single leading `www.` label is dropped. Anything that does
/// not reduce to `label(.label)+.tld` is rejected.
pub fn normalize_domain(input: &str) -> Result<String, ApiError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidDomain(input.to_string()));
    }

    // Take the host out of a pasted URL: drop the scheme, then cut at
    // the first path, query, fragment, or port separator.
    let host = match trimmed.split_once("://") {
        Some((_, rest)) => rest,
        None => trimmed,
    };
    let host = host
        .split(['/', '?', '#', ':'])
        .next()
        .unwrap_or_default()
        .to_lowercase();

    let candidate = host.strip_prefix("www.").unwrap_or(&host);

    if DOMAIN_RE.is_match(candidate) {
        Ok(candidate.to_string())
    } else {
        Err(ApiError::InvalidDomain(candidate.to_string()))
    }
}
