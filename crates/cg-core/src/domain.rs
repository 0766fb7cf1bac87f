//! Host and cookie-domain helpers
//!
//! Backed by Mozilla's Public Suffix List via the `psl` crate, so cookie
//! domains can be validated and parent domains walked only as far as the
//! registrable domain (eTLD+1).
//!
//! # Examples
//!
//! ```
//! use cg_core::domain::registrable_domain;
//!
//! assert_eq!(registrable_domain("sub.example.com").as_deref(), Some("example.com"));
//! assert_eq!(registrable_domain("sub.example.co.uk").as_deref(), Some("example.co.uk"));
//! ```

use std::net::IpAddr;

use psl::{List, Psl};

/// Get the registrable domain (eTLD+1) for a host.
/// Returns `None` for public suffixes and hosts without one.
pub fn registrable_domain(host: &str) -> Option<String> {
    let host = host.to_ascii_lowercase();
    psl::domain(host.as_bytes())
        .and_then(|d| std::str::from_utf8(d.as_bytes()).ok())
        .map(str::to_string)
}

/// Whether `domain` itself is a public suffix (`com`, `co.uk`, ...).
pub fn is_public_suffix(domain: &str) -> bool {
    let domain = domain.to_ascii_lowercase();
    match List.suffix(domain.as_bytes()) {
        Some(suffix) => suffix.as_bytes() == domain.as_bytes(),
        None => false,
    }
}

/// Whether `host` is `domain` or one of its subdomains.
pub fn domain_matches(host: &str, domain: &str) -> bool {
    if host.eq_ignore_ascii_case(domain) {
        return true;
    }
    if is_ip_address(host) {
        return false;
    }
    host.len() > domain.len()
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
        && host[host.len() - domain.len()..].eq_ignore_ascii_case(domain)
}

/// Get the parent domain (strip first label).
#[inline]
pub fn get_parent_domain(host: &str) -> Option<&str> {
    host.find('.').map(|pos| &host[pos + 1..]).filter(|p| !p.is_empty())
}

#[inline]
pub fn is_ip_address(host: &str) -> bool {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok()
}

/// Domain attributes to try when expiring a cookie set from `hostname`.
///
/// Starts with `None` (host-only cookie), then the host bare and dotted,
/// the same without a leading `www.`, and finally every parent domain down
/// to the registrable domain. Duplicates are dropped, order is kept.
pub fn removal_domains(hostname: &str) -> Vec<Option<String>> {
    let host = hostname.trim().trim_end_matches('.').to_ascii_lowercase();
    let mut domains = vec![None];
    if host.is_empty() {
        return domains;
    }

    push_domain(&mut domains, &host);
    if is_ip_address(&host) {
        return domains;
    }

    let bare = host.strip_prefix("www.").unwrap_or(&host);
    push_domain(&mut domains, bare);

    if let Some(etld1) = registrable_domain(&host) {
        let mut current = host.as_str();
        while let Some(parent) = get_parent_domain(current) {
            if parent.len() < etld1.len() {
                break;
            }
            push_domain(&mut domains, parent);
            current = parent;
        }
    }

    domains
}

fn push_domain(domains: &mut Vec<Option<String>>, domain: &str) {
    for candidate in [domain.to_string(), format!(".{domain}")] {
        if !domains.iter().any(|d| d.as_deref() == Some(candidate.as_str())) {
            domains.push(Some(candidate));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(domains: Vec<Option<String>>) -> Vec<String> {
        domains.into_iter().map(|d| d.unwrap_or_default()).collect()
    }

    #[test]
    fn test_removal_domains_www_host() {
        assert_eq!(
            flat(removal_domains("www.example.com")),
            vec!["", "www.example.com", ".www.example.com", "example.com", ".example.com"]
        );
    }

    #[test]
    fn test_removal_domains_walks_to_registrable_domain() {
        assert_eq!(
            flat(removal_domains("a.shop.example.co.uk")),
            vec![
                "",
                "a.shop.example.co.uk",
                ".a.shop.example.co.uk",
                "shop.example.co.uk",
                ".shop.example.co.uk",
                "example.co.uk",
                ".example.co.uk",
            ]
        );
    }

    #[test]
    fn test_removal_domains_ip_and_empty() {
        assert_eq!(flat(removal_domains("127.0.0.1")), vec!["", "127.0.0.1", ".127.0.0.1"]);
        assert_eq!(flat(removal_domains("")), vec![""]);
    }

    #[test]
    fn test_domain_matches() {
        assert!(domain_matches("www.example.com", "example.com"));
        assert!(domain_matches("example.com", "EXAMPLE.com"));
        assert!(!domain_matches("badexample.com", "example.com"));
        assert!(!domain_matches("example.com", "www.example.com"));
        assert!(!domain_matches("10.0.0.1", "0.0.1"));
    }

    #[test]
    fn test_is_public_suffix() {
        assert!(is_public_suffix("com"));
        assert!(is_public_suffix("co.uk"));
        assert!(!is_public_suffix("example.com"));
    }

    #[test]
    fn test_get_parent_domain() {
        assert_eq!(get_parent_domain("sub.example.com"), Some("example.com"));
        assert_eq!(get_parent_domain("example.com"), Some("com"));
        assert_eq!(get_parent_domain("com"), None);
        assert_eq!(get_parent_domain(""), None);
    }
}
