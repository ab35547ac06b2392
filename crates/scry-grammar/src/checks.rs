//! Static grammar validation.
//!
//! Independent passes over the rule registry; every pass runs and every
//! finding is reported in one sweep. The ambiguity and empty-alternative
//! passes are skipped for rules where left recursion was found, since
//! path computation is meaningless there. `ignored_issues` suppresses
//! ambiguity findings only, keyed by `OR<idx>` decision keys.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use scry_core::{ParserConfig, TokenTypeId, TokenTypeRegistry};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::interp::{alternative_paths, possible_paths_from};
use crate::props::first_nonterminals;
use crate::tree::{
    Alternation, DslKind, Grammar, NonTerminal, Optional, Production, Repetition,
    RepetitionMandatory, RepetitionMandatoryWithSeparator, RepetitionWithSeparator, Rule, Sequence,
};
use crate::visitor::{GrammarVisitor, walk_rule};

/// Ceiling on alternatives per alternation, kept for compatibility of
/// decision numbering with grammars written against the original limit.
pub const MAX_ALTERNATIVES: usize = 256;

/// Marker prefixing nested production names, e.g. `$values`.
pub const NESTED_NAME_MARKER: char = '$';

/// Run every validation pass.
pub fn validate_grammar(
    grammar: &Grammar,
    registry: &TokenTypeRegistry,
    config: &ParserConfig,
) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    check_duplicate_rule_names(grammar, &mut diagnostics);
    check_naming(grammar, registry, &mut diagnostics);
    check_namespace_conflicts(grammar, registry, &mut diagnostics);
    check_unresolved_references(grammar, &mut diagnostics);
    let left_recursive = check_left_recursion(grammar, &mut diagnostics);

    for rule in grammar.rules() {
        check_duplicate_productions(rule, registry, &mut diagnostics);
        check_nested_names(rule, &mut diagnostics);

        let mut decisions = DecisionCollector::default();
        walk_rule(rule, &mut decisions);

        for (kind, idx, body) in &decisions.repetitions {
            check_dead_repetition(grammar, rule, *kind, *idx, body, &mut diagnostics);
        }

        for alternation in &decisions.alternations {
            check_alternative_count(rule, alternation, &mut diagnostics);
            if left_recursive.contains(&rule.name) {
                continue;
            }
            check_empty_alternatives(grammar, rule, alternation, &mut diagnostics);

            let key = DslKind::Or.decision_key(alternation.idx);
            if config.is_ignored(&rule.name, &key) {
                continue;
            }
            let k = alternation.max_lookahead.unwrap_or(config.max_lookahead);
            let partitions = alternative_paths(grammar, alternation, k);
            check_exact_ambiguity(rule, alternation, &partitions, registry, &mut diagnostics);
            check_prefix_ambiguity(rule, alternation, &partitions, registry, &mut diagnostics);
        }
    }

    diagnostics
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_valid_nested_name(name: &str) -> bool {
    name.strip_prefix(NESTED_NAME_MARKER)
        .is_some_and(is_valid_name)
}

fn check_duplicate_rule_names(grammar: &Grammar, diagnostics: &mut Diagnostics) {
    for name in grammar.duplicate_rule_names() {
        diagnostics
            .report(DiagnosticKind::DuplicateRuleName, name)
            .message(name)
            .emit();
    }
}

fn check_naming(grammar: &Grammar, registry: &TokenTypeRegistry, diagnostics: &mut Diagnostics) {
    for rule in grammar.rules() {
        if !is_valid_name(&rule.name) {
            diagnostics
                .report(DiagnosticKind::InvalidRuleName, &rule.name)
                .message(&rule.name)
                .emit();
        }
    }
    for (_, name) in registry.iter() {
        if !is_valid_name(name) {
            diagnostics
                .report(DiagnosticKind::InvalidTokenName, "")
                .message(name)
                .emit();
        }
    }
}

fn check_namespace_conflicts(
    grammar: &Grammar,
    registry: &TokenTypeRegistry,
    diagnostics: &mut Diagnostics,
) {
    for rule in grammar.rules() {
        if registry.id_for(&rule.name).is_some() {
            diagnostics
                .report(DiagnosticKind::NamespaceConflict, &rule.name)
                .message(&rule.name)
                .emit();
        }
    }
}

fn check_unresolved_references(grammar: &Grammar, diagnostics: &mut Diagnostics) {
    for rule in grammar.rules() {
        let mut refs = ReferenceCollector::default();
        walk_rule(rule, &mut refs);
        for target in refs.targets {
            if grammar.rule(&target).is_none() {
                diagnostics
                    .report(DiagnosticKind::UnresolvedReference, &rule.name)
                    .message(&target)
                    .emit();
            }
        }
    }
}

/// Reports every zero-consumption reference chain and returns the names
/// of the rules involved, so dependent passes can skip them.
fn check_left_recursion(grammar: &Grammar, diagnostics: &mut Diagnostics) -> HashSet<String> {
    let mut recursive = HashSet::new();
    for rule in grammar.rules() {
        let mut chains = Vec::new();
        find_recursion_chains(grammar, &rule.name, &rule.body, &mut Vec::new(), &mut chains);
        for chain in &chains {
            let mut full = vec![rule.name.clone()];
            full.extend(chain.iter().cloned());
            diagnostics
                .report(DiagnosticKind::LeftRecursion, &rule.name)
                .message(full.join(" --> "))
                .emit();
        }
        if !chains.is_empty() {
            recursive.insert(rule.name.clone());
        }
    }
    recursive
}

fn find_recursion_chains(
    grammar: &Grammar,
    top: &str,
    body: &[Production],
    path: &mut Vec<String>,
    out: &mut Vec<Vec<String>>,
) {
    let firsts = first_nonterminals(grammar, body);
    if firsts.is_empty() {
        return;
    }
    if firsts.iter().any(|name| name == top) {
        let mut chain = path.clone();
        chain.push(top.to_string());
        out.push(chain);
    }
    // Explore each target once per path; already-visited targets are
    // pruned to bound the search.
    let mut seen = BTreeSet::new();
    for step in firsts {
        if step == top || path.contains(&step) || !seen.insert(step.clone()) {
            continue;
        }
        let Some(rule) = grammar.rule(&step) else {
            continue;
        };
        path.push(step);
        find_recursion_chains(grammar, top, &rule.body, path, out);
        path.pop();
    }
}

fn check_duplicate_productions(
    rule: &Rule,
    registry: &TokenTypeRegistry,
    diagnostics: &mut Diagnostics,
) {
    let mut occurrences = OccurrenceCollector::default();
    walk_rule(rule, &mut occurrences);

    let mut groups: BTreeMap<(String, Option<String>), usize> = BTreeMap::new();
    for (kind, idx, target) in occurrences.seen {
        let target = match target {
            OccurrenceTarget::Token(tt) => {
                Some(registry.name(tt).unwrap_or("<unknown>").to_string())
            }
            OccurrenceTarget::Rule(name) => Some(name),
            OccurrenceTarget::None => None,
        };
        *groups.entry((kind.decision_key(idx), target)).or_default() += 1;
    }

    for ((key, target), count) in groups {
        if count < 2 {
            continue;
        }
        let detail = match target {
            Some(target) => format!("`{key}` targeting `{target}` appears {count} times"),
            None => format!("`{key}` appears {count} times"),
        };
        diagnostics
            .report(DiagnosticKind::DuplicateProduction, &rule.name)
            .message(detail)
            .emit();
    }
}

fn check_nested_names(rule: &Rule, diagnostics: &mut Diagnostics) {
    let mut names = NestedNameCollector::default();
    walk_rule(rule, &mut names);

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in &names.found {
        if !is_valid_nested_name(name) {
            diagnostics
                .report(DiagnosticKind::InvalidNestedName, &rule.name)
                .message(name)
                .emit();
        }
        *counts.entry(name.as_str()).or_default() += 1;
    }
    for (name, count) in counts {
        if count > 1 {
            diagnostics
                .report(DiagnosticKind::DuplicateNestedName, &rule.name)
                .message(name)
                .emit();
        }
    }
}

fn check_dead_repetition(
    grammar: &Grammar,
    rule: &Rule,
    kind: DslKind,
    idx: u32,
    body: &[Production],
    diagnostics: &mut Diagnostics,
) {
    let consumes = possible_paths_from(grammar, body, 1)
        .iter()
        .any(|path| !path.is_empty());
    if !consumes {
        diagnostics
            .report(DiagnosticKind::DeadRepetition, &rule.name)
            .message(format!("`{}` has an empty body first-set", kind.decision_key(idx)))
            .occurrence(idx)
            .emit();
    }
}

fn check_alternative_count(rule: &Rule, alternation: &Alternation, diagnostics: &mut Diagnostics) {
    let count = alternation.alternatives.len();
    if count > MAX_ALTERNATIVES {
        diagnostics
            .report(DiagnosticKind::TooManyAlternatives, &rule.name)
            .message(format!("{count} alternatives declared"))
            .occurrence(alternation.idx)
            .emit();
    }
}

fn check_empty_alternatives(
    grammar: &Grammar,
    rule: &Rule,
    alternation: &Alternation,
    diagnostics: &mut Diagnostics,
) {
    let Some((_, leading)) = alternation.alternatives.split_last() else {
        return;
    };
    for (i, alternative) in leading.iter().enumerate() {
        let first_set_empty = possible_paths_from(grammar, &alternative.elements, 1)
            .iter()
            .all(|path| path.is_empty());
        if first_set_empty {
            diagnostics
                .report(DiagnosticKind::EmptyAlternative, &rule.name)
                .message(format!("alternative {} can match no tokens", i + 1))
                .occurrence(alternation.idx)
                .alternatives(vec![i + 1])
                .emit();
        }
    }
}

fn check_exact_ambiguity(
    rule: &Rule,
    alternation: &Alternation,
    partitions: &[Vec<Vec<TokenTypeId>>],
    registry: &TokenTypeRegistry,
    diagnostics: &mut Diagnostics,
) {
    let mut owners: HashMap<&[TokenTypeId], BTreeSet<usize>> = HashMap::new();
    for (alt, paths) in partitions.iter().enumerate() {
        for path in paths {
            owners.entry(path.as_slice()).or_default().insert(alt + 1);
        }
    }

    // One finding per conflicting alternative set, exemplified by its
    // lexically smallest shared path.
    let mut conflicts: BTreeMap<Vec<usize>, &[TokenTypeId]> = BTreeMap::new();
    for (path, alts) in owners {
        if alts.len() < 2 {
            continue;
        }
        let alts: Vec<usize> = alts.into_iter().collect();
        match conflicts.entry(alts) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(path);
            }
            std::collections::btree_map::Entry::Occupied(mut slot) => {
                if path < *slot.get() {
                    slot.insert(path);
                }
            }
        }
    }

    for (alts, path) in conflicts {
        let detail = format!(
            "alternatives <{}> may all begin with [{}]",
            join_indices(&alts),
            render_path(path, registry)
        );
        diagnostics
            .report(DiagnosticKind::AmbiguousAlternatives, &rule.name)
            .message(detail)
            .occurrence(alternation.idx)
            .alternatives(alts)
            .emit();
    }
}

fn check_prefix_ambiguity(
    rule: &Rule,
    alternation: &Alternation,
    partitions: &[Vec<Vec<TokenTypeId>>],
    registry: &TokenTypeRegistry,
    diagnostics: &mut Diagnostics,
) {
    // A strict-prefix relation between two alternatives' paths means
    // inputs matching the shorter path leave both alternatives viable;
    // ordered choice silently resolves it. Pairs are reported
    // earlier-to-later whichever side owns the shorter path.
    let mut pairs: BTreeMap<(usize, usize), &[TokenTypeId]> = BTreeMap::new();
    for i in 0..partitions.len() {
        for j in (i + 1)..partitions.len() {
            for a in &partitions[i] {
                for b in &partitions[j] {
                    let prefix = if a.len() < b.len() && b.starts_with(a) {
                        a
                    } else if !b.is_empty() && b.len() < a.len() && a.starts_with(b) {
                        // An empty path on the later side is the legal
                        // trailing-fallback idiom, owned by the
                        // empty-alternative pass.
                        b
                    } else {
                        continue;
                    };
                    pairs.entry((i + 1, j + 1)).or_insert(prefix);
                }
            }
        }
    }

    for ((earlier, later), prefix) in pairs {
        let detail = format!(
            "alternatives <{earlier}, {later}> share the lookahead prefix [{}]",
            render_path(prefix, registry)
        );
        diagnostics
            .report(DiagnosticKind::AmbiguousPrefixAlternatives, &rule.name)
            .message(detail)
            .occurrence(alternation.idx)
            .alternatives(vec![earlier, later])
            .emit();
    }
}

fn render_path(path: &[TokenTypeId], registry: &TokenTypeRegistry) -> String {
    path.iter()
        .map(|&tt| registry.label(tt))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Default)]
struct ReferenceCollector {
    targets: BTreeSet<String>,
}

impl GrammarVisitor for ReferenceCollector {
    fn visit_non_terminal(&mut self, non_terminal: &NonTerminal) {
        self.targets.insert(non_terminal.rule_name.clone());
    }
}

enum OccurrenceTarget {
    Token(TokenTypeId),
    Rule(String),
    None,
}

#[derive(Default)]
struct OccurrenceCollector {
    seen: Vec<(DslKind, u32, OccurrenceTarget)>,
}

impl GrammarVisitor for OccurrenceCollector {
    fn visit_production(&mut self, prod: &Production) {
        let Some(kind) = prod.dsl_kind() else {
            return;
        };
        let target = match prod {
            Production::Terminal(t) => OccurrenceTarget::Token(t.token_type),
            Production::NonTerminal(nt) => OccurrenceTarget::Rule(nt.rule_name.clone()),
            _ => OccurrenceTarget::None,
        };
        self.seen.push((kind, prod.idx(), target));
    }
}

#[derive(Default)]
struct NestedNameCollector {
    found: Vec<String>,
}

impl GrammarVisitor for NestedNameCollector {
    fn visit_sequence(&mut self, sequence: &Sequence) {
        self.found.extend(sequence.name.clone());
    }

    fn visit_optional(&mut self, optional: &Optional) {
        self.found.extend(optional.name.clone());
    }

    fn visit_repetition(&mut self, repetition: &Repetition) {
        self.found.extend(repetition.name.clone());
    }

    fn visit_repetition_mandatory(&mut self, repetition: &RepetitionMandatory) {
        self.found.extend(repetition.name.clone());
    }

    fn visit_repetition_with_separator(&mut self, repetition: &RepetitionWithSeparator) {
        self.found.extend(repetition.name.clone());
    }

    fn visit_repetition_mandatory_with_separator(
        &mut self,
        repetition: &RepetitionMandatoryWithSeparator,
    ) {
        self.found.extend(repetition.name.clone());
    }

    fn visit_alternation(&mut self, alternation: &Alternation) {
        self.found.extend(alternation.name.clone());
    }

    fn visit_alternative(&mut self, alternative: &crate::tree::Alternative) {
        self.found.extend(alternative.name.clone());
    }
}

#[derive(Default)]
struct DecisionCollector {
    alternations: Vec<Alternation>,
    repetitions: Vec<(DslKind, u32, Vec<Production>)>,
}

impl GrammarVisitor for DecisionCollector {
    fn visit_alternation(&mut self, alternation: &Alternation) {
        self.alternations.push(alternation.clone());
    }

    fn visit_repetition(&mut self, repetition: &Repetition) {
        self.repetitions
            .push((DslKind::Many, repetition.idx, repetition.elements.clone()));
    }

    fn visit_repetition_mandatory(&mut self, repetition: &RepetitionMandatory) {
        self.repetitions.push((
            DslKind::AtLeastOne,
            repetition.idx,
            repetition.elements.clone(),
        ));
    }

    fn visit_repetition_with_separator(&mut self, repetition: &RepetitionWithSeparator) {
        self.repetitions.push((
            DslKind::ManySep,
            repetition.idx,
            repetition.elements.clone(),
        ));
    }

    fn visit_repetition_mandatory_with_separator(
        &mut self,
        repetition: &RepetitionMandatoryWithSeparator,
    ) {
        self.repetitions.push((
            DslKind::AtLeastOneSep,
            repetition.idx,
            repetition.elements.clone(),
        ));
    }
}
