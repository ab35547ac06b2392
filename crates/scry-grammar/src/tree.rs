//! Grammar tree model.
//!
//! Immutable value objects describing productions. Rules live in a
//! name-keyed registry on [`Grammar`]; a [`NonTerminal`] holds only the
//! referenced rule's name and resolves through the registry at traversal
//! time, so recursive and mutually recursive grammars need no ownership
//! cycles.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use scry_core::TokenTypeId;
use serde::{Deserialize, Serialize};

/// Index of a rule inside its [`Grammar`], stable for the grammar's
/// lifetime. Used in lookahead-cache keys.
pub type RuleId = u32;

/// Per-alternative guard, evaluated before lookahead matching. A failing
/// gate removes its alternative from consideration for that decision.
pub type Gate = Arc<dyn Fn() -> bool + Send + Sync>;

/// The construct kinds a rule body is built from, named after the parsing
/// DSL the original grammars are authored in. Appears in diagnostics and
/// lookahead-cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DslKind {
    Consume,
    Subrule,
    Option,
    Or,
    Many,
    AtLeastOne,
    ManySep,
    AtLeastOneSep,
}

impl DslKind {
    /// Key identifying one decision point inside a rule, e.g. `OR` for
    /// occurrence 0 and `OR2` for occurrence 2. Matches the keys accepted
    /// by `ignored_issues`.
    pub fn decision_key(self, idx: u32) -> String {
        if idx == 0 {
            self.to_string()
        } else {
            format!("{self}{idx}")
        }
    }
}

impl fmt::Display for DslKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DslKind::Consume => "CONSUME",
            DslKind::Subrule => "SUBRULE",
            DslKind::Option => "OPTION",
            DslKind::Or => "OR",
            DslKind::Many => "MANY",
            DslKind::AtLeastOne => "AT_LEAST_ONE",
            DslKind::ManySep => "MANY_SEP",
            DslKind::AtLeastOneSep => "AT_LEAST_ONE_SEP",
        };
        f.write_str(name)
    }
}

/// A production node. The tree is immutable once a [`Grammar`] is built;
/// analyses attach derived data elsewhere (diagnostics, compiled
/// lookahead) rather than mutating nodes.
#[derive(Debug, Clone)]
pub enum Production {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
    Sequence(Sequence),
    Optional(Optional),
    Repetition(Repetition),
    RepetitionMandatory(RepetitionMandatory),
    RepetitionWithSeparator(RepetitionWithSeparator),
    RepetitionMandatoryWithSeparator(RepetitionMandatoryWithSeparator),
    Alternation(Alternation),
}

/// Reference to a token type to consume.
#[derive(Debug, Clone)]
pub struct Terminal {
    pub token_type: TokenTypeId,
    /// Occurrence index disambiguating repeated consumption of the same
    /// token type within one rule.
    pub idx: u32,
    /// Explicit CST child key; the registry name of the token type is
    /// used when absent.
    pub label: Option<String>,
}

/// Reference to another rule, by name.
#[derive(Debug, Clone)]
pub struct NonTerminal {
    pub rule_name: String,
    pub idx: u32,
    pub label: Option<String>,
}

/// Plain ordered sequence of productions (no decision of its own).
#[derive(Debug, Clone)]
pub struct Sequence {
    pub elements: Vec<Production>,
    pub name: Option<String>,
}

/// Zero-or-one block.
#[derive(Debug, Clone)]
pub struct Optional {
    pub elements: Vec<Production>,
    pub idx: u32,
    pub name: Option<String>,
}

/// Zero-or-more loop.
#[derive(Debug, Clone)]
pub struct Repetition {
    pub elements: Vec<Production>,
    pub idx: u32,
    pub name: Option<String>,
}

/// One-or-more loop.
#[derive(Debug, Clone)]
pub struct RepetitionMandatory {
    pub elements: Vec<Production>,
    pub idx: u32,
    pub name: Option<String>,
}

/// Zero-or-more loop with a separator terminal between iterations.
#[derive(Debug, Clone)]
pub struct RepetitionWithSeparator {
    pub elements: Vec<Production>,
    pub separator: TokenTypeId,
    pub idx: u32,
    pub name: Option<String>,
}

/// One-or-more loop with a separator terminal between iterations.
#[derive(Debug, Clone)]
pub struct RepetitionMandatoryWithSeparator {
    pub elements: Vec<Production>,
    pub separator: TokenTypeId,
    pub idx: u32,
    pub name: Option<String>,
}

/// Ordered choice between alternatives. Earlier alternatives win ties.
#[derive(Debug, Clone)]
pub struct Alternation {
    pub alternatives: Vec<Alternative>,
    pub idx: u32,
    pub name: Option<String>,
    /// Local override of the configured lookahead budget for this
    /// decision only.
    pub max_lookahead: Option<usize>,
}

/// One branch of an [`Alternation`].
#[derive(Clone)]
pub struct Alternative {
    pub elements: Vec<Production>,
    pub name: Option<String>,
    pub gate: Option<Gate>,
}

impl fmt::Debug for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alternative")
            .field("elements", &self.elements)
            .field("name", &self.name)
            .field("gate", &self.gate.as_ref().map(|_| "<gate>"))
            .finish()
    }
}

impl Terminal {
    pub fn new(token_type: TokenTypeId) -> Self {
        Self {
            token_type,
            idx: 0,
            label: None,
        }
    }

    pub fn with_idx(mut self, idx: u32) -> Self {
        self.idx = idx;
        self
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl NonTerminal {
    pub fn new(rule_name: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            idx: 0,
            label: None,
        }
    }

    pub fn with_idx(mut self, idx: u32) -> Self {
        self.idx = idx;
        self
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl Sequence {
    pub fn new(elements: Vec<Production>) -> Self {
        Self {
            elements,
            name: None,
        }
    }
}

impl Optional {
    pub fn new(elements: Vec<Production>) -> Self {
        Self {
            elements,
            idx: 0,
            name: None,
        }
    }

    pub fn with_idx(mut self, idx: u32) -> Self {
        self.idx = idx;
        self
    }
}

impl Repetition {
    pub fn new(elements: Vec<Production>) -> Self {
        Self {
            elements,
            idx: 0,
            name: None,
        }
    }

    pub fn with_idx(mut self, idx: u32) -> Self {
        self.idx = idx;
        self
    }
}

impl RepetitionMandatory {
    pub fn new(elements: Vec<Production>) -> Self {
        Self {
            elements,
            idx: 0,
            name: None,
        }
    }

    pub fn with_idx(mut self, idx: u32) -> Self {
        self.idx = idx;
        self
    }
}

impl RepetitionWithSeparator {
    pub fn new(elements: Vec<Production>, separator: TokenTypeId) -> Self {
        Self {
            elements,
            separator,
            idx: 0,
            name: None,
        }
    }

    pub fn with_idx(mut self, idx: u32) -> Self {
        self.idx = idx;
        self
    }
}

impl RepetitionMandatoryWithSeparator {
    pub fn new(elements: Vec<Production>, separator: TokenTypeId) -> Self {
        Self {
            elements,
            separator,
            idx: 0,
            name: None,
        }
    }

    pub fn with_idx(mut self, idx: u32) -> Self {
        self.idx = idx;
        self
    }
}

impl Alternation {
    pub fn new(alternatives: Vec<Alternative>) -> Self {
        Self {
            alternatives,
            idx: 0,
            name: None,
            max_lookahead: None,
        }
    }

    pub fn with_idx(mut self, idx: u32) -> Self {
        self.idx = idx;
        self
    }

    pub fn with_max_lookahead(mut self, k: usize) -> Self {
        self.max_lookahead = Some(k);
        self
    }
}

impl Alternative {
    pub fn new(elements: Vec<Production>) -> Self {
        Self {
            elements,
            name: None,
            gate: None,
        }
    }

    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }
}

impl Production {
    /// DSL construct kind, `None` for plain sequences (which carry no
    /// occurrence index and form no decision point).
    pub fn dsl_kind(&self) -> Option<DslKind> {
        match self {
            Production::Terminal(_) => Some(DslKind::Consume),
            Production::NonTerminal(_) => Some(DslKind::Subrule),
            Production::Sequence(_) => None,
            Production::Optional(_) => Some(DslKind::Option),
            Production::Repetition(_) => Some(DslKind::Many),
            Production::RepetitionMandatory(_) => Some(DslKind::AtLeastOne),
            Production::RepetitionWithSeparator(_) => Some(DslKind::ManySep),
            Production::RepetitionMandatoryWithSeparator(_) => Some(DslKind::AtLeastOneSep),
            Production::Alternation(_) => Some(DslKind::Or),
        }
    }

    pub fn idx(&self) -> u32 {
        match self {
            Production::Terminal(t) => t.idx,
            Production::NonTerminal(nt) => nt.idx,
            Production::Sequence(_) => 0,
            Production::Optional(o) => o.idx,
            Production::Repetition(r) => r.idx,
            Production::RepetitionMandatory(r) => r.idx,
            Production::RepetitionWithSeparator(r) => r.idx,
            Production::RepetitionMandatoryWithSeparator(r) => r.idx,
            Production::Alternation(a) => a.idx,
        }
    }

    /// Nested-production label, when the author tagged this construct.
    pub fn label(&self) -> Option<&str> {
        match self {
            Production::Terminal(t) => t.label.as_deref(),
            Production::NonTerminal(nt) => nt.label.as_deref(),
            Production::Sequence(s) => s.name.as_deref(),
            Production::Optional(o) => o.name.as_deref(),
            Production::Repetition(r) => r.name.as_deref(),
            Production::RepetitionMandatory(r) => r.name.as_deref(),
            Production::RepetitionWithSeparator(r) => r.name.as_deref(),
            Production::RepetitionMandatoryWithSeparator(r) => r.name.as_deref(),
            Production::Alternation(a) => a.name.as_deref(),
        }
    }
}

/// A named top-level production.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub body: Vec<Production>,
    /// Original declaration text, carried for diagnostics only.
    pub source_text: String,
}

impl Rule {
    pub fn new(name: impl Into<String>, body: Vec<Production>) -> Self {
        Self {
            name: name.into(),
            body,
            source_text: String::new(),
        }
    }

    pub fn with_source(mut self, source_text: impl Into<String>) -> Self {
        self.source_text = source_text.into();
        self
    }
}

/// Name-keyed rule registry. Declaration order is preserved and assigns
/// each rule its [`RuleId`].
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    rules: IndexMap<String, Rule>,
    /// Names declared more than once; the first declaration wins, the
    /// validator reports the rest.
    duplicate_rule_names: Vec<String>,
}

impl Grammar {
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut map = IndexMap::with_capacity(rules.len());
        let mut duplicates = Vec::new();
        for rule in rules {
            if map.contains_key(&rule.name) {
                duplicates.push(rule.name);
            } else {
                map.insert(rule.name.clone(), rule);
            }
        }
        Self {
            rules: map,
            duplicate_rule_names: duplicates,
        }
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.rules.get_index_of(name).map(|idx| idx as RuleId)
    }

    pub fn rule_name(&self, id: RuleId) -> Option<&str> {
        self.rules
            .get_index(id as usize)
            .map(|(name, _)| name.as_str())
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn duplicate_rule_names(&self) -> &[String] {
        &self.duplicate_rule_names
    }
}
