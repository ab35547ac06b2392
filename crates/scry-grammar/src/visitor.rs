//! Depth-first traversal over a rule body.
//!
//! Traversal always descends into child productions regardless of which
//! hooks an implementation overrides. [`NonTerminal`] is a leaf: walking
//! stays inside one rule body and never follows references into other
//! rules, so recursive grammars terminate.

use crate::tree::{
    Alternation, Alternative, NonTerminal, Optional, Production, Repetition, RepetitionMandatory,
    RepetitionMandatoryWithSeparator, RepetitionWithSeparator, Rule, Sequence, Terminal,
};

/// Visitor hooks, all no-ops by default. `visit_production` fires for
/// every node before its kind-specific hook.
pub trait GrammarVisitor {
    fn visit_rule(&mut self, _rule: &Rule) {}
    fn visit_production(&mut self, _prod: &Production) {}
    fn visit_terminal(&mut self, _terminal: &Terminal) {}
    fn visit_non_terminal(&mut self, _non_terminal: &NonTerminal) {}
    fn visit_sequence(&mut self, _sequence: &Sequence) {}
    fn visit_optional(&mut self, _optional: &Optional) {}
    fn visit_repetition(&mut self, _repetition: &Repetition) {}
    fn visit_repetition_mandatory(&mut self, _repetition: &RepetitionMandatory) {}
    fn visit_repetition_with_separator(&mut self, _repetition: &RepetitionWithSeparator) {}
    fn visit_repetition_mandatory_with_separator(
        &mut self,
        _repetition: &RepetitionMandatoryWithSeparator,
    ) {
    }
    fn visit_alternation(&mut self, _alternation: &Alternation) {}
    fn visit_alternative(&mut self, _alternative: &Alternative) {}
}

/// Walk a rule: the rule hook, then its body in order.
pub fn walk_rule<V: GrammarVisitor>(rule: &Rule, visitor: &mut V) {
    visitor.visit_rule(rule);
    walk_all(&rule.body, visitor);
}

pub fn walk_all<V: GrammarVisitor>(productions: &[Production], visitor: &mut V) {
    for prod in productions {
        walk_production(prod, visitor);
    }
}

pub fn walk_production<V: GrammarVisitor>(prod: &Production, visitor: &mut V) {
    visitor.visit_production(prod);
    match prod {
        Production::Terminal(t) => visitor.visit_terminal(t),
        Production::NonTerminal(nt) => visitor.visit_non_terminal(nt),
        Production::Sequence(s) => {
            visitor.visit_sequence(s);
            walk_all(&s.elements, visitor);
        }
        Production::Optional(o) => {
            visitor.visit_optional(o);
            walk_all(&o.elements, visitor);
        }
        Production::Repetition(r) => {
            visitor.visit_repetition(r);
            walk_all(&r.elements, visitor);
        }
        Production::RepetitionMandatory(r) => {
            visitor.visit_repetition_mandatory(r);
            walk_all(&r.elements, visitor);
        }
        Production::RepetitionWithSeparator(r) => {
            visitor.visit_repetition_with_separator(r);
            walk_all(&r.elements, visitor);
        }
        Production::RepetitionMandatoryWithSeparator(r) => {
            visitor.visit_repetition_mandatory_with_separator(r);
            walk_all(&r.elements, visitor);
        }
        Production::Alternation(a) => {
            visitor.visit_alternation(a);
            for alternative in &a.alternatives {
                visitor.visit_alternative(alternative);
                walk_all(&alternative.elements, visitor);
            }
        }
    }
}
