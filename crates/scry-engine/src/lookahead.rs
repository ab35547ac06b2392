//! Compiled lookahead predicates.
//!
//! A predicate is plain data derived from the bounded path search, plus
//! an evaluation method; keeping the path sets inspectable lets tooling
//! explain why a decision went one way. Predicates are pure functions of
//! the grammar, so recompiling one for the same decision always yields
//! behaviorally identical data.

use scry_core::TokenTypeId;
use scry_grammar::interp::{alternative_paths, enter_paths};
use scry_grammar::{Alternation, Grammar, LookaheadPath, Production};

/// Compiled decision data for one decision point.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledLookahead {
    Alt(AltPredicate),
    Enter(EnterPredicate),
}

impl CompiledLookahead {
    pub fn as_alt(&self) -> Option<&AltPredicate> {
        match self {
            CompiledLookahead::Alt(p) => Some(p),
            CompiledLookahead::Enter(_) => None,
        }
    }

    pub fn as_enter(&self) -> Option<&EnterPredicate> {
        match self {
            CompiledLookahead::Alt(_) => None,
            CompiledLookahead::Enter(p) => Some(p),
        }
    }
}

/// Alternation predicate: one path partition per alternative, in branch
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct AltPredicate {
    pub partitions: Vec<Vec<LookaheadPath>>,
    /// Whether any alternative carries a gate; informational only, the
    /// caller supplies gate outcomes at evaluation time.
    pub gated: bool,
}

impl AltPredicate {
    /// Pick the alternative for the upcoming tokens.
    ///
    /// `live[i]` is the gate outcome for alternative `i` (missing entries
    /// count as live). Alternatives are tried in declaration order; the
    /// first whose partition holds a path fully matched by the upcoming
    /// tokens wins, so an earlier alternative always shadows a later one
    /// on shared prefixes and an empty path acts as an unconditional
    /// fallback.
    pub fn choose<F>(&self, live: &[bool], mut la: F) -> Option<usize>
    where
        F: FnMut(usize) -> Option<TokenTypeId>,
    {
        for (i, paths) in self.partitions.iter().enumerate() {
            if !live.get(i).copied().unwrap_or(true) {
                continue;
            }
            if paths.iter().any(|path| path_matches(path, &mut la)) {
                return Some(i);
            }
        }
        None
    }
}

/// Enter/skip predicate for optional constructs.
#[derive(Debug, Clone, PartialEq)]
pub struct EnterPredicate {
    /// Token paths the construct's body can begin with. Empty paths are
    /// dropped at build time; entering on zero consumable tokens would
    /// never terminate a loop.
    pub paths: Vec<LookaheadPath>,
}

impl EnterPredicate {
    pub fn matches<F>(&self, mut la: F) -> bool
    where
        F: FnMut(usize) -> Option<TokenTypeId>,
    {
        self.paths.iter().any(|path| path_matches(path, &mut la))
    }
}

fn path_matches<F>(path: &[TokenTypeId], la: &mut F) -> bool
where
    F: FnMut(usize) -> Option<TokenTypeId>,
{
    path.iter()
        .enumerate()
        .all(|(i, &expected)| la(i + 1) == Some(expected))
}

/// Compile the predicate for an alternation. The alternation's local
/// `max_lookahead` override takes precedence over the configured budget.
pub fn build_alt_predicate(
    grammar: &Grammar,
    alternation: &Alternation,
    default_k: usize,
) -> AltPredicate {
    let k = alternation.max_lookahead.unwrap_or(default_k);
    AltPredicate {
        partitions: alternative_paths(grammar, alternation, k),
        gated: alternation
            .alternatives
            .iter()
            .any(|alternative| alternative.gate.is_some()),
    }
}

/// Compile the enter predicate for an optional construct.
pub fn build_enter_predicate(
    grammar: &Grammar,
    decision: &Production,
    k: usize,
) -> EnterPredicate {
    let mut paths = enter_paths(grammar, decision, k);
    paths.retain(|path| !path.is_empty());
    EnterPredicate { paths }
}

#[cfg(test)]
mod lookahead_tests {
    use scry_grammar::{Alternative, Optional, Repetition, Rule, Terminal};

    use super::*;

    const A: u16 = 0;
    const B: u16 = 1;
    const C: u16 = 2;

    fn t(tt: u16) -> Production {
        Production::Terminal(Terminal::new(tt))
    }

    fn la_over(tokens: &[u16]) -> impl FnMut(usize) -> Option<TokenTypeId> + '_ {
        move |n| tokens.get(n - 1).copied()
    }

    #[test]
    fn disjoint_first_sets_choose_exhaustively() {
        let grammar = Grammar::default();
        let alternation = Alternation::new(vec![
            Alternative::new(vec![t(A)]),
            Alternative::new(vec![t(B)]),
            Alternative::new(vec![t(C)]),
        ]);
        let predicate = build_alt_predicate(&grammar, &alternation, 5);

        for (tt, expected) in [(A, 0), (B, 1), (C, 2)] {
            assert_eq!(predicate.choose(&[], la_over(&[tt])), Some(expected));
        }
        assert_eq!(predicate.choose(&[], la_over(&[9])), None);
    }

    #[test]
    fn earlier_alternative_wins_shared_prefixes() {
        let grammar = Grammar::default();
        let alternation = Alternation::new(vec![
            Alternative::new(vec![t(A), t(B)]),
            Alternative::new(vec![t(A)]),
        ]);
        let predicate = build_alt_predicate(&grammar, &alternation, 5);

        assert_eq!(predicate.choose(&[], la_over(&[A, B])), Some(0));
        // Inputs diverging after A fall through to the shorter branch.
        assert_eq!(predicate.choose(&[], la_over(&[A, C])), Some(1));
    }

    #[test]
    fn failing_gate_removes_an_alternative() {
        let grammar = Grammar::default();
        let alternation = Alternation::new(vec![
            Alternative::new(vec![t(A)]),
            Alternative::new(vec![t(A), t(B)]),
        ]);
        let predicate = build_alt_predicate(&grammar, &alternation, 5);

        assert_eq!(predicate.choose(&[true, true], la_over(&[A, B])), Some(0));
        assert_eq!(predicate.choose(&[false, true], la_over(&[A, B])), Some(1));
        assert_eq!(predicate.choose(&[false, false], la_over(&[A, B])), None);
    }

    #[test]
    fn empty_last_alternative_is_a_fallback() {
        let grammar = Grammar::default();
        let alternation = Alternation::new(vec![
            Alternative::new(vec![t(A)]),
            Alternative::new(vec![]),
        ]);
        let predicate = build_alt_predicate(&grammar, &alternation, 5);

        assert_eq!(predicate.choose(&[], la_over(&[A])), Some(0));
        assert_eq!(predicate.choose(&[], la_over(&[B])), Some(1));
        assert_eq!(predicate.choose(&[], la_over(&[])), Some(1));
    }

    #[test]
    fn enter_predicate_drops_empty_paths() {
        let grammar = Grammar::default();
        let dead = Production::Repetition(Repetition::new(vec![]));
        let predicate = build_enter_predicate(&grammar, &dead, 5);
        assert!(predicate.paths.is_empty());
        assert!(!predicate.matches(la_over(&[A])));

        let live = Production::Optional(Optional::new(vec![t(A), t(B)]));
        let predicate = build_enter_predicate(&grammar, &live, 5);
        assert!(predicate.matches(la_over(&[A, B])));
        assert!(!predicate.matches(la_over(&[A, C])));
        assert!(!predicate.matches(la_over(&[B])));
    }

    #[test]
    fn recompilation_is_behaviorally_identical() {
        let grammar = Grammar::new(vec![Rule::new("leaf", vec![t(B)])]);
        let alternation = Alternation::new(vec![
            Alternative::new(vec![t(A)]),
            Alternative::new(vec![Production::NonTerminal(
                scry_grammar::NonTerminal::new("leaf"),
            )]),
        ]);
        let first = build_alt_predicate(&grammar, &alternation, 5);
        let second = build_alt_predicate(&grammar, &alternation, 5);
        assert_eq!(first, second);
    }
}
