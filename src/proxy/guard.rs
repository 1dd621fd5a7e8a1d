//! URL Guard
//!
//! Format and SSRF checks applied to caller-supplied image URLs before any
//! network access. Host checks are lexical: no DNS resolution happens here.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;
use url::{Host, Url};

use crate::error::{ProxyError, Result};

/// Absolute http(s) URL without credentials or whitespace.
static IMAGE_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(\[[0-9a-f:.]+\]|[a-z0-9](?:[a-z0-9.-]*[a-z0-9])?)(:\d{1,5})?([/?#]\S*)?$")
        .expect("image URL pattern is valid")
});

/// Schemes that are never fetched.
const BLOCKED_SCHEMES: &[&str] = &["file", "ftp", "data"];

/// Runs the format check, then the target check.
pub fn validate_image_url(raw: &str) -> Result<Url> {
    let url = check_format(raw)?;
    check_target(&url)?;
    Ok(url)
}

/// Accepts only strict absolute http(s) URLs.
pub fn check_format(raw: &str) -> Result<Url> {
    if !IMAGE_URL_PATTERN.is_match(raw) {
        return Err(ProxyError::InvalidUrl(raw.to_string()));
    }
    Url::parse(raw).map_err(|e| ProxyError::InvalidUrl(format!("{}: {}", raw, e)))
}

/// Rejects blocked schemes and loopback, private or link-local hosts.
pub fn check_target(url: &Url) -> Result<()> {
    if is_blocked_target(url) {
        return Err(ProxyError::BlockedTarget(url.to_string()));
    }
    Ok(())
}

pub fn is_blocked_target(url: &Url) -> bool {
    if BLOCKED_SCHEMES.contains(&url.scheme()) {
        return true;
    }

    match url.host() {
        Some(Host::Domain(domain)) => is_local_domain(domain),
        Some(Host::Ipv4(addr)) => is_blocked_ipv4(addr),
        Some(Host::Ipv6(addr)) => is_blocked_ipv6(addr),
        None => true,
    }
}

fn is_local_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    domain == "localhost" || domain.ends_with(".localhost")
}

fn is_blocked_ipv4(addr: Ipv4Addr) -> bool {
    addr.is_loopback() || addr.is_private() || addr.is_link_local() || addr.is_unspecified()
}

fn is_blocked_ipv6(addr: Ipv6Addr) -> bool {
    if let Some(mapped) = addr.to_ipv4_mapped() {
        return is_blocked_ipv4(mapped);
    }
    // fc00::/7 unique local, fe80::/10 link local
    let first = addr.segments()[0];
    addr.is_loopback() || addr.is_unspecified() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
}
