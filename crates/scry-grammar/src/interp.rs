//! Bounded lookahead path search.
//!
//! Enumerates every token sequence of length at most `k` that a
//! production sequence can begin with. Loops are unrolled and rule
//! references inlined; two guards bound the search on cyclic grammars,
//! both keyed on the remaining budget so that only zero-consumption
//! revisits are cut:
//!
//! - a rule guard on `(rule name, budget)` cuts left-recursive inlining,
//! - a loop guard on `(loop identity, budget)` cuts re-iteration of a
//!   loop whose body consumed nothing.
//!
//! Paths shorter than `k` arise where the sequence ends early; callers
//! treat them as prefixes when matching upcoming tokens.

use scry_core::TokenTypeId;

use crate::tree::{Alternation, DslKind, Grammar, Production};

/// One possible sequence of upcoming token types, at most `k` long.
pub type LookaheadPath = Vec<TokenTypeId>;

/// A pending item on the unrolled sequence. `Loop` is the re-iteration
/// point of a repetition, identified by the address of its body slice;
/// separator variants consume their separator before each re-iteration.
#[derive(Clone, Copy)]
enum Step<'g> {
    Prod(&'g Production),
    Token(TokenTypeId),
    Loop {
        elements: &'g [Production],
        separator: Option<TokenTypeId>,
    },
}

struct PathSearch<'g> {
    grammar: &'g Grammar,
    rule_guards: Vec<(&'g str, usize)>,
    loop_guards: Vec<(usize, usize)>,
    prefix: LookaheadPath,
    out: Vec<LookaheadPath>,
}

/// All token paths of length at most `k` that `elements` can start with.
pub fn possible_paths_from(
    grammar: &Grammar,
    elements: &[Production],
    k: usize,
) -> Vec<LookaheadPath> {
    let mut search = PathSearch {
        grammar,
        rule_guards: Vec::new(),
        loop_guards: Vec::new(),
        prefix: Vec::new(),
        out: Vec::new(),
    };
    let seq: Vec<Step<'_>> = elements.iter().map(Step::Prod).collect();
    search.collect(&seq, k);
    search.out
}

/// Per-alternative path partitions for an alternation, in branch order.
pub fn alternative_paths(
    grammar: &Grammar,
    alternation: &Alternation,
    k: usize,
) -> Vec<Vec<LookaheadPath>> {
    alternation
        .alternatives
        .iter()
        .map(|alternative| possible_paths_from(grammar, &alternative.elements, k))
        .collect()
}

/// "Enter" paths of an optional construct: the token sequences its body
/// can begin with. Empty for kinds that are not enter/skip decisions.
pub fn enter_paths(grammar: &Grammar, decision: &Production, k: usize) -> Vec<LookaheadPath> {
    let body = match decision {
        Production::Optional(o) => &o.elements,
        Production::Repetition(r) => &r.elements,
        Production::RepetitionMandatory(r) => &r.elements,
        Production::RepetitionWithSeparator(r) => &r.elements,
        Production::RepetitionMandatoryWithSeparator(r) => &r.elements,
        _ => return Vec::new(),
    };
    possible_paths_from(grammar, body, k)
}

/// Locate the decision construct with the given kind and occurrence index
/// inside a rule body. Searches nested productions and all alternation
/// branches.
pub fn find_decision<'g>(
    body: &'g [Production],
    kind: DslKind,
    idx: u32,
) -> Option<&'g Production> {
    for prod in body {
        if prod.dsl_kind() == Some(kind) && prod.idx() == idx {
            return Some(prod);
        }
        let found = match prod {
            Production::Terminal(_) | Production::NonTerminal(_) => None,
            Production::Sequence(s) => find_decision(&s.elements, kind, idx),
            Production::Optional(o) => find_decision(&o.elements, kind, idx),
            Production::Repetition(r) => find_decision(&r.elements, kind, idx),
            Production::RepetitionMandatory(r) => find_decision(&r.elements, kind, idx),
            Production::RepetitionWithSeparator(r) => find_decision(&r.elements, kind, idx),
            Production::RepetitionMandatoryWithSeparator(r) => {
                find_decision(&r.elements, kind, idx)
            }
            Production::Alternation(a) => a
                .alternatives
                .iter()
                .find_map(|alternative| find_decision(&alternative.elements, kind, idx)),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

impl<'g> PathSearch<'g> {
    fn collect(&mut self, seq: &[Step<'g>], budget: usize) {
        if budget == 0 || seq.is_empty() {
            self.out.push(self.prefix.clone());
            return;
        }
        let (head, tail) = seq.split_first().expect("seq is non-empty");

        match *head {
            Step::Token(tt) => {
                self.prefix.push(tt);
                self.collect(tail, budget - 1);
                self.prefix.pop();
            }
            Step::Loop {
                elements,
                separator,
            } => {
                // Zero further iterations.
                self.collect(tail, budget);

                let key = (elements.as_ptr() as usize, budget);
                if self.loop_guards.contains(&key) {
                    // The previous iteration consumed nothing; further
                    // unrolling cannot produce new paths.
                    return;
                }
                self.loop_guards.push(key);
                let mut next = Vec::with_capacity(elements.len() + tail.len() + 2);
                if let Some(sep) = separator {
                    next.push(Step::Token(sep));
                }
                next.extend(elements.iter().map(Step::Prod));
                next.push(Step::Loop {
                    elements,
                    separator,
                });
                next.extend_from_slice(tail);
                self.collect(&next, budget);
                self.loop_guards.pop();
            }
            Step::Prod(prod) => self.collect_production(prod, tail, budget),
        }
    }

    fn collect_production(&mut self, prod: &'g Production, tail: &[Step<'g>], budget: usize) {
        match prod {
            Production::Terminal(t) => {
                self.prefix.push(t.token_type);
                self.collect(tail, budget - 1);
                self.prefix.pop();
            }
            Production::NonTerminal(nt) => {
                let key = (nt.rule_name.as_str(), budget);
                if self.rule_guards.contains(&key) {
                    // Re-entered without consuming; cut the cycle.
                    return;
                }
                // Unresolved references produce no paths; the validator
                // reports them.
                let Some(rule) = self.grammar.rule(&nt.rule_name) else {
                    return;
                };
                self.rule_guards.push(key);
                self.collect(&Self::splice(&rule.body, &[], tail), budget);
                self.rule_guards.pop();
            }
            Production::Sequence(s) => {
                self.collect(&Self::splice(&s.elements, &[], tail), budget);
            }
            Production::Optional(o) => {
                self.collect(tail, budget);
                self.collect(&Self::splice(&o.elements, &[], tail), budget);
            }
            Production::Repetition(r) => {
                self.collect(tail, budget);
                self.collect_first_iteration(&r.elements, None, tail, budget);
            }
            Production::RepetitionMandatory(r) => {
                self.collect_first_iteration(&r.elements, None, tail, budget);
            }
            Production::RepetitionWithSeparator(r) => {
                self.collect(tail, budget);
                self.collect_first_iteration(&r.elements, Some(r.separator), tail, budget);
            }
            Production::RepetitionMandatoryWithSeparator(r) => {
                self.collect_first_iteration(&r.elements, Some(r.separator), tail, budget);
            }
            Production::Alternation(a) => {
                for alternative in &a.alternatives {
                    self.collect(&Self::splice(&alternative.elements, &[], tail), budget);
                }
            }
        }
    }

    /// Body once, then the loop's re-iteration point, then the tail.
    fn collect_first_iteration(
        &mut self,
        elements: &'g [Production],
        separator: Option<TokenTypeId>,
        tail: &[Step<'g>],
        budget: usize,
    ) {
        let loop_step = [Step::Loop {
            elements,
            separator,
        }];
        self.collect(&Self::splice(elements, &loop_step, tail), budget);
    }

    fn splice(
        productions: &'g [Production],
        mid: &[Step<'g>],
        tail: &[Step<'g>],
    ) -> Vec<Step<'g>> {
        let mut next = Vec::with_capacity(productions.len() + mid.len() + tail.len());
        next.extend(productions.iter().map(Step::Prod));
        next.extend_from_slice(mid);
        next.extend_from_slice(tail);
        next
    }
}
