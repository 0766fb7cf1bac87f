use std::cell::RefCell;

use cg_core::{CompiledMatcher, CookieGate, CookieJar, Diagnostics, MatcherSet};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use regex::Regex;

const PATTERNS: &[&str] = &["^_ga", "^_gid$", "^_fbp$", "^_hj", "^wp-dark-mode-", "^mp_.*_mixpanel$"];

fn matchers() -> MatcherSet {
    PATTERNS
        .iter()
        .map(|p| CompiledMatcher::new(*p, Regex::new(p).unwrap()))
        .collect()
}

fn bench_gate(c: &mut Criterion) {
    let gate = CookieGate::new(
        matchers(),
        RefCell::new(CookieJar::new("www.example.com")),
        Diagnostics::disabled(),
    );

    c.bench_function("gate_blocked_write", |b| {
        b.iter(|| gate.write(black_box("_ga_XYZ=GA1.1.123; path=/; max-age=63072000")))
    });

    c.bench_function("gate_check_unmatched", |b| {
        b.iter(|| gate.check(black_box("session_id=abc123; path=/")))
    });
}

criterion_group!(benches, bench_gate);
criterion_main!(benches);
