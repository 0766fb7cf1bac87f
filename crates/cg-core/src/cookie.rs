//! Cookie string helpers
//!
//! Works on the two string shapes scripts see: a single assignment
//! (`name=value; path=/; ...`) and the read-side list (`a=1; b=2`).

/// Expiry date written by the sweeper.
pub const EPOCH_EXPIRES: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Extract the cookie name from an assignment string.
///
/// The name is everything before the first `=`, trimmed. Without any `=`
/// the whole string (trimmed) is taken as the name.
pub fn cookie_name(assignment: &str) -> &str {
    match assignment.find('=') {
        Some(pos) => assignment[..pos].trim(),
        None => assignment.trim(),
    }
}

/// Split a read-side cookie string into `(name, value)` pairs.
///
/// Blank entries are skipped; names and values are trimmed.
pub fn split_cookie_string(cookies: &str) -> impl Iterator<Item = (&str, &str)> {
    cookies.split(';').filter_map(|entry| {
        let (name, value) = match entry.find('=') {
            Some(pos) => (&entry[..pos], &entry[pos + 1..]),
            None => (entry, ""),
        };
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some((name, value.trim()))
        }
    })
}

/// Build an assignment that expires `name` for the given domain/path.
///
/// `None` leaves the attribute out so the store applies its defaults.
pub fn expiration_assignment(name: &str, domain: Option<&str>, path: Option<&str>) -> String {
    let mut out = format!("{name}=; expires={EPOCH_EXPIRES}");
    if let Some(path) = path {
        out.push_str("; path=");
        out.push_str(path);
    }
    if let Some(domain) = domain {
        out.push_str("; domain=");
        out.push_str(domain);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_name() {
        assert_eq!(cookie_name("wp-dark-mode-theme=dark"), "wp-dark-mode-theme");
        assert_eq!(cookie_name("  _ga_XYZ = 1; path=/"), "_ga_XYZ");
        assert_eq!(cookie_name("a=b=c"), "a");
        assert_eq!(cookie_name("flag"), "flag");
        assert_eq!(cookie_name("=value"), "");
        assert_eq!(cookie_name(""), "");
    }

    #[test]
    fn test_split_cookie_string() {
        let pairs: Vec<_> = split_cookie_string("a=1; b=2;c= 3 ; ; flag").collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2"), ("c", "3"), ("flag", "")]);
        assert_eq!(split_cookie_string("").count(), 0);
    }

    #[test]
    fn test_split_keeps_equals_in_value() {
        let pairs: Vec<_> = split_cookie_string("token=a=b==").collect();
        assert_eq!(pairs, vec![("token", "a=b==")]);
    }

    #[test]
    fn test_expiration_assignment() {
        assert_eq!(
            expiration_assignment("_ga", None, None),
            "_ga=; expires=Thu, 01 Jan 1970 00:00:00 GMT"
        );
        assert_eq!(
            expiration_assignment("_ga", Some(".example.com"), Some("/")),
            "_ga=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/; domain=.example.com"
        );
    }
}
