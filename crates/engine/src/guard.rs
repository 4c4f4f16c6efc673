//! Permission and usage-quota gating for block invocations.
//!
//! Permission is tag subsumption: the calling job must hold every tag the
//! block requires. Quotas cap how many times a single run may invoke a
//! block; the block's own default ceiling can be overridden per job, with
//! `*`/`?` wildcards matching block display names.

use indexmap::IndexMap;

use blockflow_registry::BlockDescriptor;

/// Verdict for one attempted block invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Invoke the block; the usage counter has been charged.
    Granted,
    /// The job is missing at least one tag the block requires.
    Forbidden,
    /// The usage ceiling was already consumed; skip without invoking.
    QuotaExhausted,
}

/// Case-sensitive glob match supporting `*` (any run) and `?` (any one
/// character). Operates on characters, not bytes.
pub fn pattern_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

/// Per-run admission state: usage counters plus the job's ceiling
/// overrides.
#[derive(Debug, Default)]
pub struct UsageGuard {
    counters: IndexMap<String, u32>,
    overrides: IndexMap<String, Option<u32>>,
}

impl UsageGuard {
    /// Builds a guard from a job's `block_limits` table. Override keys are
    /// normalized to upper case so they match display names.
    pub fn new(overrides: &IndexMap<String, Option<u32>>) -> Self {
        UsageGuard {
            counters: IndexMap::new(),
            overrides: overrides
                .iter()
                .map(|(pattern, limit)| (pattern.trim().to_ascii_uppercase(), *limit))
                .collect(),
        }
    }

    /// The effective ceiling for a block: the first matching override wins,
    /// otherwise the block's own default. `None` means unlimited.
    pub fn limit_for(&self, descriptor: &BlockDescriptor) -> Option<u32> {
        let name = descriptor.display_name();
        for (pattern, limit) in &self.overrides {
            if pattern_match(pattern, &name) {
                return *limit;
            }
        }
        descriptor.max_uses
    }

    /// How many times the block has been invoked so far this run.
    pub fn uses(&self, display_name: &str) -> u32 {
        self.counters.get(display_name).copied().unwrap_or(0)
    }

    /// Gates one invocation: permission first, then quota. A granted
    /// admission charges the counter.
    pub fn admit(&mut self, descriptor: &BlockDescriptor, job_tags: &[String]) -> Admission {
        if !descriptor.tags.iter().all(|tag| job_tags.contains(tag)) {
            return Admission::Forbidden;
        }
        let name = descriptor.display_name();
        if let Some(limit) = self.limit_for(descriptor) {
            if self.uses(&name) >= limit {
                return Admission::QuotaExhausted;
            }
        }
        *self.counters.entry(name).or_insert(0) += 1;
        Admission::Granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, category: Option<&str>) -> BlockDescriptor {
        let mut builder = BlockDescriptor::builder(name);
        if let Some(category) = category {
            builder = builder.category(category);
        }
        builder.build().unwrap()
    }

    #[test]
    fn wildcards_match_display_names() {
        assert!(pattern_match("MATH.*", "MATH.SUM"));
        assert!(pattern_match("*.SUM", "MATH.SUM"));
        assert!(pattern_match("MATH.SU?", "MATH.SUM"));
        assert!(pattern_match("*", "ANYTHING"));
        assert!(!pattern_match("MATH.*", "TEXT.JOIN"));
        assert!(!pattern_match("MATH.SU?", "MATH.SUMS"));
        assert!(pattern_match("", ""));
        assert!(!pattern_match("", "X"));
    }

    #[test]
    fn missing_tags_are_forbidden() {
        let restricted = BlockDescriptor::builder("danger").tag("admin").build().unwrap();
        let mut guard = UsageGuard::default();
        assert_eq!(guard.admit(&restricted, &[]), Admission::Forbidden);
        assert_eq!(
            guard.admit(&restricted, &["admin".into()]),
            Admission::Granted
        );
    }

    #[test]
    fn default_ceiling_counts_down() {
        let capped = BlockDescriptor::builder("once").max_uses(1).build().unwrap();
        let mut guard = UsageGuard::default();
        assert_eq!(guard.admit(&capped, &[]), Admission::Granted);
        assert_eq!(guard.admit(&capped, &[]), Admission::QuotaExhausted);
        assert_eq!(guard.uses("ONCE"), 1);
    }

    #[test]
    fn overrides_beat_defaults_and_support_wildcards() {
        let capped = descriptor("sum", Some("math"));
        let mut overrides = IndexMap::new();
        overrides.insert("math.*".to_string(), Some(2));
        let mut guard = UsageGuard::new(&overrides);
        assert_eq!(guard.limit_for(&capped), Some(2));
        assert_eq!(guard.admit(&capped, &[]), Admission::Granted);
        assert_eq!(guard.admit(&capped, &[]), Admission::Granted);
        assert_eq!(guard.admit(&capped, &[]), Admission::QuotaExhausted);
    }

    #[test]
    fn null_override_lifts_the_limit() {
        let capped = BlockDescriptor::builder("once").max_uses(1).build().unwrap();
        let mut overrides = IndexMap::new();
        overrides.insert("ONCE".to_string(), None);
        let mut guard = UsageGuard::new(&overrides);
        for _ in 0..10 {
            assert_eq!(guard.admit(&capped, &[]), Admission::Granted);
        }
    }

    #[test]
    fn first_matching_override_wins() {
        let capped = descriptor("sum", Some("math"));
        let mut overrides = IndexMap::new();
        overrides.insert("MATH.SUM".to_string(), Some(5));
        overrides.insert("MATH.*".to_string(), Some(1));
        let guard = UsageGuard::new(&overrides);
        assert_eq!(guard.limit_for(&capped), Some(5));
    }
}
