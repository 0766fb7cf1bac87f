//! Sweep Cleaner
//!
//! Scans everything currently readable and force-expires cookies whose
//! name matches. The original domain/path of a cookie cannot be read back,
//! so expiration is attempted for every plausible combination.
//!
//! Takes a [`CookieStore`], never the gate: the gate would block the
//! expiration write itself.

use std::collections::HashSet;

use crate::cookie::{expiration_assignment, split_cookie_string};
use crate::diagnostics::Diagnostics;
use crate::domain::removal_domains;
use crate::matcher::MatcherSet;
use crate::store::CookieStore;
use crate::types::SweepReport;

/// Paths tried for each domain: the store's default, root, then every
/// prefix of the page path a visible cookie could have been set on.
///
/// ```
/// use cg_core::sweep::removal_paths;
///
/// let paths = removal_paths("/blog/post");
/// assert_eq!(paths[0], None);
/// assert!(paths.contains(&Some("/blog".to_string())));
/// assert!(paths.contains(&Some("/blog/post".to_string())));
/// ```
pub fn removal_paths(page_path: &str) -> Vec<Option<String>> {
    let mut paths: Vec<Option<String>> = vec![None, Some("/".to_string())];
    let mut push = |path: &str| {
        let candidate = Some(path.to_string());
        if !path.is_empty() && !paths.contains(&candidate) {
            paths.push(candidate);
        }
    };

    if page_path.starts_with('/') {
        for (pos, _) in page_path.match_indices('/') {
            push(&page_path[..pos]);
            push(&page_path[..=pos]);
        }
        push(page_path);
    }
    paths
}

/// Run one sweep over `store`.
pub fn sweep<S: CookieStore + ?Sized>(
    store: &S,
    matchers: &MatcherSet,
    diagnostics: &Diagnostics,
) -> SweepReport {
    let mut report = SweepReport::default();
    if matchers.is_empty() {
        return report;
    }

    let cookies = store.read();
    let mut expired: HashSet<&str> = HashSet::new();
    let mut candidates: Option<(Vec<Option<String>>, Vec<Option<String>>)> = None;

    for (name, _) in split_cookie_string(&cookies) {
        report.scanned += 1;
        if !matchers.matches(name) {
            continue;
        }
        report.removed += 1;

        // Same name at several paths shows up once per path; one round of
        // expirations covers them all.
        if !expired.insert(name) {
            continue;
        }
        report.names.push(name.to_string());

        let (domains, paths) = candidates.get_or_insert_with(|| {
            (removal_domains(&store.hostname()), removal_paths(&store.pathname()))
        });
        for domain in domains.iter() {
            for path in paths.iter() {
                // Best effort: a combination that does not apply is ignored.
                let _ = store.write(&expiration_assignment(name, domain.as_deref(), path.as_deref()));
            }
        }
    }

    if !report.names.is_empty() {
        let remaining = store.read();
        let still_present: HashSet<&str> = split_cookie_string(&remaining).map(|(n, _)| n).collect();
        report.survivors = report
            .names
            .iter()
            .filter(|n| still_present.contains(n.as_str()))
            .cloned()
            .collect();
    }

    diagnostics.swept(&report);
    report
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use regex::Regex;

    use super::*;
    use crate::jar::CookieJar;
    use crate::matcher::CompiledMatcher;
    use crate::store::StoreError;

    fn matchers(patterns: &[&str]) -> MatcherSet {
        patterns
            .iter()
            .map(|p| CompiledMatcher::new(*p, Regex::new(p).unwrap()))
            .collect()
    }

    fn jar(host: &str, assignments: &[&str]) -> RefCell<CookieJar> {
        let mut jar = CookieJar::new(host);
        for a in assignments {
            jar.set(a);
        }
        RefCell::new(jar)
    }

    #[test]
    fn test_sweep_removes_matching_cookies_across_attributes() {
        let store = jar(
            "www.example.com",
            &[
                "_ga_XYZ=123",
                "_ga_ABC=1; path=/; domain=.example.com",
                "_ga_DEF=1; domain=www.example.com",
                "session_id=abc",
            ],
        );
        let report = sweep(&store, &matchers(&["^_ga_"]), &Diagnostics::disabled());

        assert_eq!(report.scanned, 4);
        assert_eq!(report.removed, 3);
        assert_eq!(report.names, vec!["_ga_XYZ", "_ga_ABC", "_ga_DEF"]);
        assert!(report.survivors.is_empty());
        assert_eq!(store.read(), "session_id=abc");
    }

    #[test]
    fn test_second_sweep_removes_nothing() {
        let store = jar("www.example.com", &["_ga_XYZ=123", "keep=1"]);
        let matchers = matchers(&["^_ga_"]);

        let first = sweep(&store, &matchers, &Diagnostics::disabled());
        assert_eq!(first.removed, 1);

        let second = sweep(&store, &matchers, &Diagnostics::disabled());
        assert_eq!(second.removed, 0);
        assert_eq!(second.scanned, 1);
    }

    #[test]
    fn test_parent_domain_cookie_is_removed() {
        let store = jar("a.shop.example.com", &["track=1; domain=shop.example.com"]);
        let report = sweep(&store, &matchers(&["^track$"]), &Diagnostics::disabled());
        assert_eq!(report.removed, 1);
        assert_eq!(store.read(), "");
    }

    #[test]
    fn test_removal_paths_cover_page_prefixes() {
        assert_eq!(removal_paths("/"), vec![None, Some("/".to_string())]);
        assert_eq!(
            removal_paths("/blog/post/"),
            vec![
                None,
                Some("/".to_string()),
                Some("/blog".to_string()),
                Some("/blog/".to_string()),
                Some("/blog/post".to_string()),
                Some("/blog/post/".to_string()),
            ]
        );
        assert_eq!(removal_paths(""), vec![None, Some("/".to_string())]);
    }

    #[test]
    fn test_cookie_on_page_path_is_removed_once() {
        let store = RefCell::new(CookieJar::new("example.com").with_page_path("/blog/post"));
        store.borrow_mut().set("track=1; path=/blog/post");
        let matchers = matchers(&["^track$"]);

        let first = sweep(&store, &matchers, &Diagnostics::disabled());
        assert_eq!(first.removed, 1);
        assert!(first.survivors.is_empty());
        assert_eq!(store.read(), "");

        let second = sweep(&store, &matchers, &Diagnostics::disabled());
        assert_eq!(second.removed, 0);
    }

    #[test]
    fn test_duplicate_names_counted_per_entry() {
        let store = RefCell::new(CookieJar::new("example.com").with_page_path("/blog/post/"));
        store.borrow_mut().set("track=1; path=/");
        store.borrow_mut().set("track=2; path=/blog");
        let report = sweep(&store, &matchers(&["^track$"]), &Diagnostics::disabled());
        assert_eq!(report.scanned, 2);
        assert_eq!(report.removed, 2);
        assert_eq!(report.names, vec!["track"]);
        assert!(report.survivors.is_empty());
        assert_eq!(store.read(), "");
    }

    #[test]
    fn test_empty_matcher_set_never_writes() {
        struct Refusing;
        impl CookieStore for Refusing {
            fn read(&self) -> String {
                "a=1; b=2".to_string()
            }
            fn write(&self, _: &str) -> Result<(), StoreError> {
                panic!("sweep with no matchers must not write");
            }
            fn hostname(&self) -> String {
                "example.com".to_string()
            }
        }

        let report = sweep(&Refusing, &MatcherSet::empty(), &Diagnostics::disabled());
        assert_eq!(report, SweepReport::default());
    }

    #[test]
    fn test_write_failures_are_ignored() {
        struct Failing;
        impl CookieStore for Failing {
            fn read(&self) -> String {
                "_ga=1".to_string()
            }
            fn write(&self, _: &str) -> Result<(), StoreError> {
                Err(StoreError::Rejected("sandboxed".to_string()))
            }
            fn hostname(&self) -> String {
                "example.com".to_string()
            }
        }

        let report = sweep(&Failing, &matchers(&["^_ga"]), &Diagnostics::disabled());
        assert_eq!(report.removed, 1);
        assert_eq!(report.survivors, vec!["_ga"]);
    }
}
