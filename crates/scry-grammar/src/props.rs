//! Derived structural predicates over productions.
//!
//! Both predicates resolve [`NonTerminal`] references through the grammar
//! registry and guard against recursion, so they are total on cyclic
//! grammars.

use crate::tree::{Grammar, Production};

/// Whether `prod` can match the empty token sequence.
///
/// Directly true for the zero-iteration constructs (Optional, Repetition,
/// RepetitionWithSeparator). An Alternation is optional when any
/// alternative is; sequence-like nodes when every element is. A rule
/// reference already on the recursion path is treated as not provably
/// optional.
pub fn is_optional(grammar: &Grammar, prod: &Production) -> bool {
    is_optional_guarded(grammar, prod, &mut Vec::new())
}

/// Whether every element of a sequence can match empty. True for an empty
/// sequence.
pub fn all_optional(grammar: &Grammar, elements: &[Production]) -> bool {
    let mut visited = Vec::new();
    elements
        .iter()
        .all(|prod| is_optional_guarded(grammar, prod, &mut visited))
}

fn is_optional_guarded(grammar: &Grammar, prod: &Production, visited: &mut Vec<String>) -> bool {
    match prod {
        Production::Optional(_)
        | Production::Repetition(_)
        | Production::RepetitionWithSeparator(_) => true,
        Production::Terminal(_) => false,
        Production::Alternation(alt) => alt.alternatives.iter().any(|alternative| {
            alternative
                .elements
                .iter()
                .all(|sub| is_optional_guarded(grammar, sub, visited))
        }),
        Production::NonTerminal(nt) => {
            if visited.iter().any(|name| name == &nt.rule_name) {
                return false;
            }
            visited.push(nt.rule_name.clone());
            match grammar.rule(&nt.rule_name) {
                Some(rule) => rule
                    .body
                    .iter()
                    .all(|sub| is_optional_guarded(grammar, sub, visited)),
                None => false,
            }
        }
        Production::Sequence(s) => s
            .elements
            .iter()
            .all(|sub| is_optional_guarded(grammar, sub, visited)),
        Production::RepetitionMandatory(r) => r
            .elements
            .iter()
            .all(|sub| is_optional_guarded(grammar, sub, visited)),
        Production::RepetitionMandatoryWithSeparator(r) => r
            .elements
            .iter()
            .all(|sub| is_optional_guarded(grammar, sub, visited)),
    }
}

/// Names of the rules reachable at the left edge of `elements` before any
/// terminal can be consumed.
///
/// Descends into every Alternation branch and, when the first element is
/// optional, also into the tail of the sequence. Unresolved references are
/// reported as-is; the reference validator owns that defect.
pub fn first_nonterminals(grammar: &Grammar, elements: &[Production]) -> Vec<String> {
    let Some(head) = elements.first() else {
        return Vec::new();
    };

    let mut result = match head {
        Production::NonTerminal(nt) => vec![nt.rule_name.clone()],
        Production::Sequence(s) => first_nonterminals(grammar, &s.elements),
        Production::Optional(o) => first_nonterminals(grammar, &o.elements),
        Production::Repetition(r) => first_nonterminals(grammar, &r.elements),
        Production::RepetitionMandatory(r) => first_nonterminals(grammar, &r.elements),
        Production::RepetitionWithSeparator(r) => first_nonterminals(grammar, &r.elements),
        Production::RepetitionMandatoryWithSeparator(r) => first_nonterminals(grammar, &r.elements),
        Production::Alternation(alt) => alt
            .alternatives
            .iter()
            .flat_map(|alternative| first_nonterminals(grammar, &alternative.elements))
            .collect(),
        Production::Terminal(_) => Vec::new(),
    };

    if is_optional(grammar, head) && elements.len() > 1 {
        result.extend(first_nonterminals(grammar, &elements[1..]));
    }
    result
}
