use crate::interp::{alternative_paths, enter_paths, find_decision, possible_paths_from};
use crate::tree::*;

const A: u16 = 0;
const B: u16 = 1;
const C: u16 = 2;
const LPAREN: u16 = 3;
const RPAREN: u16 = 4;
const X: u16 = 5;

fn t(tt: u16) -> Production {
    Production::Terminal(Terminal::new(tt))
}

fn nt(name: &str) -> Production {
    Production::NonTerminal(NonTerminal::new(name))
}

fn sorted(mut paths: Vec<Vec<u16>>) -> Vec<Vec<u16>> {
    paths.sort();
    paths.dedup();
    paths
}

#[test]
fn terminal_sequence_truncates_at_budget() {
    let grammar = Grammar::default();
    let paths = possible_paths_from(&grammar, &[t(A), t(B), t(C)], 2);
    assert_eq!(sorted(paths), vec![vec![A, B]]);
}

#[test]
fn short_sequence_yields_short_path() {
    let grammar = Grammar::default();
    let paths = possible_paths_from(&grammar, &[t(A)], 4);
    assert_eq!(sorted(paths), vec![vec![A]]);
}

#[test]
fn optional_forks_skip_and_take() {
    let grammar = Grammar::default();
    let paths = possible_paths_from(
        &grammar,
        &[Production::Optional(Optional::new(vec![t(A)])), t(B)],
        3,
    );
    assert_eq!(sorted(paths), vec![vec![A, B], vec![B]]);
}

#[test]
fn alternation_contributes_every_branch() {
    let grammar = Grammar::default();
    let alternation = Alternation::new(vec![
        Alternative::new(vec![t(A)]),
        Alternative::new(vec![t(B), t(C)]),
    ]);
    let partitions = alternative_paths(&grammar, &alternation, 3);
    assert_eq!(partitions.len(), 2);
    assert_eq!(partitions[0], vec![vec![A]]);
    assert_eq!(partitions[1], vec![vec![B, C]]);
}

#[test]
fn repetition_unrolls_within_budget() {
    let grammar = Grammar::default();
    let paths = possible_paths_from(
        &grammar,
        &[Production::Repetition(Repetition::new(vec![t(A)])), t(B)],
        3,
    );
    assert_eq!(
        sorted(paths),
        vec![vec![A, A, A], vec![A, A, B], vec![A, B], vec![B]]
    );
}

#[test]
fn mandatory_repetition_has_no_zero_iteration_branch() {
    let grammar = Grammar::default();
    let paths = possible_paths_from(
        &grammar,
        &[
            Production::RepetitionMandatory(RepetitionMandatory::new(vec![t(A)])),
            t(B),
        ],
        2,
    );
    assert_eq!(sorted(paths), vec![vec![A, A], vec![A, B]]);
}

#[test]
fn separator_appears_between_iterations() {
    let grammar = Grammar::default();
    let paths = possible_paths_from(
        &grammar,
        &[
            Production::RepetitionWithSeparator(RepetitionWithSeparator::new(vec![t(A)], C)),
            t(B),
        ],
        4,
    );
    assert_eq!(
        sorted(paths),
        vec![
            vec![A, B],
            vec![A, C, A, B],
            vec![A, C, A, C],
            vec![B],
        ]
    );
}

#[test]
fn rule_references_are_inlined() {
    let grammar = Grammar::new(vec![Rule::new("a", vec![t(A)])]);
    let paths = possible_paths_from(&grammar, &[nt("a"), t(B)], 3);
    assert_eq!(sorted(paths), vec![vec![A, B]]);
}

#[test]
fn left_recursive_reference_is_cut() {
    let grammar = Grammar::new(vec![Rule::new("e", vec![nt("e")])]);
    let body = grammar.rule("e").unwrap().body.clone();
    let paths = possible_paths_from(&grammar, &body, 3);
    assert!(paths.is_empty());
}

#[test]
fn balanced_recursion_produces_nested_paths() {
    // e = "(" e ")" | x
    let grammar = Grammar::new(vec![Rule::new(
        "e",
        vec![Production::Alternation(Alternation::new(vec![
            Alternative::new(vec![t(LPAREN), nt("e"), t(RPAREN)]),
            Alternative::new(vec![t(X)]),
        ]))],
    )]);
    let body = grammar.rule("e").unwrap().body.clone();
    let paths = possible_paths_from(&grammar, &body, 3);
    assert_eq!(
        sorted(paths),
        vec![
            vec![LPAREN, LPAREN, LPAREN],
            vec![LPAREN, LPAREN, X],
            vec![LPAREN, X, RPAREN],
            vec![X],
        ]
    );
}

#[test]
fn zero_consumption_loop_body_terminates() {
    let grammar = Grammar::default();
    let paths = possible_paths_from(
        &grammar,
        &[Production::Repetition(Repetition::new(vec![
            Production::Optional(Optional::new(vec![t(A)])),
        ]))],
        3,
    );
    assert!(sorted(paths).contains(&vec![]));
}

#[test]
fn enter_paths_cover_body_only() {
    let grammar = Grammar::default();
    let decision = Production::RepetitionWithSeparator(RepetitionWithSeparator::new(vec![t(A)], C));
    let paths = enter_paths(&grammar, &decision, 2);
    assert_eq!(sorted(paths), vec![vec![A]]);
}

#[test]
fn find_decision_searches_nested_constructs() {
    let body = vec![
        t(A),
        Production::Optional(
            Optional::new(vec![Production::Alternation(
                Alternation::new(vec![Alternative::new(vec![
                    Production::Repetition(Repetition::new(vec![t(B)]).with_idx(2)),
                ])])
                .with_idx(1),
            )])
            .with_idx(0),
        ),
    ];

    let found = find_decision(&body, DslKind::Many, 2);
    assert!(matches!(found, Some(Production::Repetition(r)) if r.idx == 2));
    assert!(find_decision(&body, DslKind::Or, 1).is_some());
    assert!(find_decision(&body, DslKind::Many, 7).is_none());
}
