//! Parser configuration.

use std::collections::{HashMap, HashSet};

/// Configuration options shared by validation and execution.
///
/// Built with chained setters:
///
/// ```
/// use scry_core::ParserConfig;
///
/// let config = ParserConfig::new().max_lookahead(3).output_cst(false);
/// assert_eq!(config.max_lookahead, 3);
/// ```
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Upper bound on lookahead path length (k). Must be positive.
    pub max_lookahead: usize,
    /// When false, all CST maintenance is skipped; consumption and
    /// branching behavior is identical.
    pub output_cst: bool,
    /// Rule name → set of decision-point keys (e.g. `"OR"`, `"OR2"`)
    /// whose ambiguity diagnostics are suppressed. Only ambiguity-class
    /// diagnostics honor this.
    pub ignored_issues: HashMap<String, HashSet<String>>,
    /// Token types may be registered after grammar construction; relaxes
    /// lookahead caching so predicates see the up-to-date registry.
    pub dynamic_tokens_enabled: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_lookahead: 5,
            output_cst: true,
            ignored_issues: HashMap::new(),
            dynamic_tokens_enabled: false,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_lookahead(mut self, k: usize) -> Self {
        assert!(k > 0, "max_lookahead must be positive");
        self.max_lookahead = k;
        self
    }

    pub fn output_cst(mut self, enabled: bool) -> Self {
        self.output_cst = enabled;
        self
    }

    pub fn dynamic_tokens_enabled(mut self, enabled: bool) -> Self {
        self.dynamic_tokens_enabled = enabled;
        self
    }

    /// Suppress ambiguity diagnostics for one decision point of a rule.
    pub fn ignore_issue(mut self, rule: impl Into<String>, decision: impl Into<String>) -> Self {
        self.ignored_issues
            .entry(rule.into())
            .or_default()
            .insert(decision.into());
        self
    }

    /// Whether ambiguity diagnostics for `decision` inside `rule` are
    /// suppressed.
    pub fn is_ignored(&self, rule: &str, decision: &str) -> bool {
        self.ignored_issues
            .get(rule)
            .is_some_and(|set| set.contains(decision))
    }
}
