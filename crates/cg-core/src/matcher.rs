//! Compiled cookie-name matchers
//!
//! A [`MatcherSet`] is built once per page load and shared read-only by the
//! gate and the sweeper.

use regex::Regex;

/// A regular expression compiled from one enabled pattern entry.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    source: String,
    regex: Regex,
}

impl CompiledMatcher {
    pub fn new(source: impl Into<String>, regex: Regex) -> Self {
        Self {
            source: source.into(),
            regex,
        }
    }

    /// The configured pattern string this matcher was built from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Unanchored search, so `_ga` matches `x_ga_1` unless the pattern anchors.
    #[inline]
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Ordered, immutable set of matchers.
#[derive(Debug, Clone, Default)]
pub struct MatcherSet {
    matchers: Vec<CompiledMatcher>,
}

impl MatcherSet {
    pub fn new(matchers: Vec<CompiledMatcher>) -> Self {
        Self { matchers }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompiledMatcher> {
        self.matchers.iter()
    }

    /// First matcher, in configuration order, that matches `name`.
    pub fn first_match(&self, name: &str) -> Option<&CompiledMatcher> {
        self.matchers.iter().find(|m| m.is_match(name))
    }

    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        self.first_match(name).is_some()
    }

    pub fn sources(&self) -> Vec<&str> {
        self.matchers.iter().map(CompiledMatcher::source).collect()
    }
}

impl FromIterator<CompiledMatcher> for MatcherSet {
    fn from_iter<I: IntoIterator<Item = CompiledMatcher>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a MatcherSet {
    type Item = &'a CompiledMatcher;
    type IntoIter = std::slice::Iter<'a, CompiledMatcher>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> MatcherSet {
        patterns
            .iter()
            .map(|p| CompiledMatcher::new(*p, Regex::new(p).unwrap()))
            .collect()
    }

    #[test]
    fn test_first_match_respects_order() {
        let matchers = set(&["^_ga", "_ga_"]);
        assert_eq!(matchers.first_match("_ga_XYZ").map(|m| m.source()), Some("^_ga"));
        assert_eq!(matchers.first_match("x_ga_1").map(|m| m.source()), Some("_ga_"));
        assert!(matchers.first_match("session").is_none());
    }

    #[test]
    fn test_patterns_are_regex_not_prefix() {
        let matchers = set(&["wp-dark-mode-.*theme$"]);
        assert!(matchers.matches("wp-dark-mode-theme"));
        assert!(!matchers.matches("wp-dark-mode-theme-x"));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let matchers = MatcherSet::empty();
        assert!(matchers.is_empty());
        assert!(!matchers.matches(""));
        assert!(!matchers.matches("anything"));
    }
}
