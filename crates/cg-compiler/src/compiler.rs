use cg_core::diagnostics::Diagnostics;
use cg_core::matcher::{CompiledMatcher, MatcherSet};
use cg_core::types::PatternEntry;
use regex::RegexBuilder;

/// Upper bound on the compiled size of one pattern.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    pub total: usize,
    pub disabled: usize,
    pub empty: usize,
    pub invalid: usize,
    pub compiled: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid pattern #{index} `{pattern}`: {message}")]
pub struct PatternError {
    /// Position in the configured list
    pub index: usize,
    pub pattern: String,
    pub message: String,
}

pub struct CompileOutput {
    pub matchers: MatcherSet,
    pub stats: CompileStats,
    pub errors: Vec<PatternError>,
}

/// Compile a single pattern string as a regex body.
pub fn compile_pattern(pattern: &str) -> Result<CompiledMatcher, regex::Error> {
    let regex = RegexBuilder::new(pattern)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()?;
    Ok(CompiledMatcher::new(pattern, regex))
}

/// Compile every enabled, non-empty entry, in order.
///
/// Entries that fail to compile are dropped individually and reported in
/// [`CompileOutput::errors`]; they never stop the rest of the list.
pub fn compile_patterns(entries: &[PatternEntry], diagnostics: &Diagnostics) -> CompileOutput {
    let mut stats = CompileStats {
        total: entries.len(),
        ..CompileStats::default()
    };
    let mut matchers = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        if !entry.enabled {
            stats.disabled += 1;
            continue;
        }
        if entry.pattern.is_empty() {
            stats.empty += 1;
            continue;
        }

        match compile_pattern(&entry.pattern) {
            Ok(matcher) => matchers.push(matcher),
            Err(e) => {
                diagnostics.compile_failed(&entry.pattern, &e);
                stats.invalid += 1;
                errors.push(PatternError {
                    index,
                    pattern: entry.pattern.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    stats.compiled = matchers.len();
    let matchers = MatcherSet::new(matchers);

    if matchers.is_empty() {
        diagnostics.inactive();
    } else {
        diagnostics.active(&matchers);
    }

    CompileOutput {
        matchers,
        stats,
        errors,
    }
}
