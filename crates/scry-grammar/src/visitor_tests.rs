use crate::tree::*;
use crate::visitor::{GrammarVisitor, walk_rule};

#[derive(Default)]
struct KindCounter {
    productions: usize,
    terminals: usize,
    alternatives: usize,
    rules: usize,
}

impl GrammarVisitor for KindCounter {
    fn visit_rule(&mut self, _rule: &Rule) {
        self.rules += 1;
    }

    fn visit_production(&mut self, _prod: &Production) {
        self.productions += 1;
    }

    fn visit_terminal(&mut self, _terminal: &Terminal) {
        self.terminals += 1;
    }

    fn visit_alternative(&mut self, _alternative: &Alternative) {
        self.alternatives += 1;
    }
}

#[test]
fn walk_descends_through_every_construct() {
    // rule = A (B | [C])* D
    let rule = Rule::new(
        "r",
        vec![
            Production::Terminal(Terminal::new(0)),
            Production::Repetition(Repetition::new(vec![Production::Alternation(
                Alternation::new(vec![
                    Alternative::new(vec![Production::Terminal(Terminal::new(1))]),
                    Alternative::new(vec![Production::Optional(Optional::new(vec![
                        Production::Terminal(Terminal::new(2)),
                    ]))]),
                ]),
            )])),
            Production::Terminal(Terminal::new(3)),
        ],
    );

    let mut counter = KindCounter::default();
    walk_rule(&rule, &mut counter);

    assert_eq!(counter.rules, 1);
    assert_eq!(counter.terminals, 4);
    assert_eq!(counter.alternatives, 2);
    // A, Repetition, Alternation, B, Optional, C, D
    assert_eq!(counter.productions, 7);
}

#[test]
fn non_terminal_is_a_leaf() {
    // Self-referential rule body must not recurse through the reference.
    let rule = Rule::new(
        "expr",
        vec![Production::NonTerminal(NonTerminal::new("expr"))],
    );

    let mut counter = KindCounter::default();
    walk_rule(&rule, &mut counter);
    assert_eq!(counter.productions, 1);
    assert_eq!(counter.terminals, 0);
}
