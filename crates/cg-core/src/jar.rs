//! In-memory cookie jar
//!
//! Mirrors what a page sees through its script cookie interface: writes are
//! single `Set-Cookie`-style assignments, reads return `name=value` pairs of
//! every visible cookie. Cookie identity is (name, domain, path), and a
//! host-only cookie is distinct from a domain cookie on the same host, which
//! is what makes removal depend on the attributes a cookie was set with.

use ::cookie::Cookie;
use time::OffsetDateTime;

use crate::domain::{domain_matches, is_ip_address, is_public_suffix};

bitflags::bitflags! {
    /// Attribute flags of a stored cookie.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CookieFlags: u8 {
        /// No Domain attribute; only sent to the exact host
        const HOST_ONLY = 1 << 0;
        const SECURE = 1 << 1;
    }
}

/// A cookie held by the jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    /// Lowercased, without a leading dot
    pub domain: String,
    pub path: String,
    pub expires: Option<OffsetDateTime>,
    pub flags: CookieFlags,
    seq: u64,
}

impl StoredCookie {
    #[inline]
    pub fn is_host_only(&self) -> bool {
        self.flags.contains(CookieFlags::HOST_ONLY)
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    fn same_identity(&self, other: &StoredCookie) -> bool {
        self.name == other.name
            && self.domain == other.domain
            && self.path == other.path
            && self.is_host_only() == other.is_host_only()
    }
}

/// Why the jar ignored an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Not a `name=value` pair the parser accepts
    Unparseable,
    /// `HttpOnly` cannot be set from script
    HttpOnly,
    /// Domain attribute does not cover the page host, or is a public suffix
    ForeignDomain,
}

/// Result of [`CookieJar::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Stored,
    /// Expiry in the past: the matching cookie (if any) was deleted
    Expired { deleted: bool },
    Rejected(RejectReason),
}

/// Cookie store for one page (host + path).
#[derive(Debug, Clone)]
pub struct CookieJar {
    host: String,
    page_path: String,
    cookies: Vec<StoredCookie>,
    next_seq: u64,
}

impl CookieJar {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.trim().trim_end_matches('.').to_ascii_lowercase(),
            page_path: "/".to_string(),
            cookies: Vec::new(),
            next_seq: 0,
        }
    }

    /// Set the path of the page the jar is viewed from.
    pub fn with_page_path(mut self, path: &str) -> Self {
        self.page_path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn page_path(&self) -> &str {
        &self.page_path
    }

    /// Apply one script assignment.
    pub fn set(&mut self, assignment: &str) -> SetOutcome {
        let now = OffsetDateTime::now_utc();
        let parsed = match Cookie::parse(assignment) {
            Ok(parsed) => parsed,
            Err(_) => return SetOutcome::Rejected(RejectReason::Unparseable),
        };

        if parsed.http_only().unwrap_or(false) {
            return SetOutcome::Rejected(RejectReason::HttpOnly);
        }

        let (domain, host_only) = match parsed
            .domain()
            .map(|d| d.trim_start_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
        {
            Some(d) if d == self.host => (d, is_public_suffix(&self.host) || is_ip_address(&self.host)),
            Some(d) => {
                if !domain_matches(&self.host, &d) || is_public_suffix(&d) {
                    return SetOutcome::Rejected(RejectReason::ForeignDomain);
                }
                (d, false)
            }
            None => (self.host.clone(), true),
        };

        let path = match parsed.path() {
            Some(p) if p.starts_with('/') => p.to_string(),
            _ => default_path(&self.page_path),
        };

        // Max-Age wins over Expires.
        let expires = match parsed.max_age() {
            Some(max_age) => Some(now + max_age),
            None => parsed.expires_datetime(),
        };

        let mut flags = CookieFlags::empty();
        flags.set(CookieFlags::HOST_ONLY, host_only);
        flags.set(CookieFlags::SECURE, parsed.secure().unwrap_or(false));

        let cookie = StoredCookie {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain,
            path,
            expires,
            flags,
            seq: self.next_seq,
        };

        let existing = self.cookies.iter().position(|c| c.same_identity(&cookie));

        if cookie.is_expired(now) {
            let deleted = existing.map(|idx| self.cookies.remove(idx)).is_some();
            return SetOutcome::Expired { deleted };
        }

        match existing {
            Some(idx) => {
                // Replacement keeps the original creation order.
                let seq = self.cookies[idx].seq;
                self.cookies[idx] = StoredCookie { seq, ..cookie };
            }
            None => {
                self.next_seq += 1;
                self.cookies.push(cookie);
            }
        }
        SetOutcome::Stored
    }

    /// Cookies visible from the page, longest path first, then oldest first.
    pub fn visible(&self) -> Vec<&StoredCookie> {
        let now = OffsetDateTime::now_utc();
        let mut visible: Vec<&StoredCookie> = self
            .cookies
            .iter()
            .filter(|c| !c.is_expired(now))
            .filter(|c| path_matches(&c.path, &self.page_path))
            .collect();
        visible.sort_by(|a, b| b.path.len().cmp(&a.path.len()).then_with(|| a.seq.cmp(&b.seq)));
        visible
    }

    /// The read-side cookie string.
    pub fn cookie_string(&self) -> String {
        self.visible()
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// First visible cookie named `name`.
    pub fn get(&self, name: &str) -> Option<&StoredCookie> {
        self.visible().into_iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Every stored cookie, visible or not.
    pub fn iter(&self) -> impl Iterator<Item = &StoredCookie> {
        self.cookies.iter()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// Default cookie path for a page path: its directory.
fn default_path(page_path: &str) -> String {
    match page_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(pos) => page_path[..pos].to_string(),
    }
}

fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if cookie_path == request_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}
