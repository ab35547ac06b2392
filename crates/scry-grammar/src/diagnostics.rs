//! Grammar diagnostics.
//!
//! Validation findings are accumulated, not returned as `Err`: one run of
//! the validator reports every defect it can see. Each diagnostic carries
//! the owning rule, the construct occurrence where applicable, and the
//! alternative indices involved (1-based, matching the numbering authors
//! see in their alternation declarations).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Diagnostic kinds, grouped by validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    // Structural defects in the rule registry
    DuplicateRuleName,
    UnresolvedReference,
    DuplicateProduction,
    DuplicateNestedName,

    // Defects that make path computation meaningless
    LeftRecursion,

    // Decision-point defects
    AmbiguousAlternatives,
    AmbiguousPrefixAlternatives,
    EmptyAlternative,
    DeadRepetition,
    TooManyAlternatives,

    // Naming conventions
    InvalidRuleName,
    InvalidNestedName,
    InvalidTokenName,
    NamespaceConflict,
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether `ignored_issues` entries may suppress this kind. Only the
    /// ambiguity findings are opt-out; every other defect is
    /// unconditional.
    pub fn is_suppressible(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousAlternatives | Self::AmbiguousPrefixAlternatives
        )
    }

    /// Base message, used when no detail is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::DuplicateRuleName => "rule is declared more than once",
            Self::UnresolvedReference => "reference to an undeclared rule",
            Self::DuplicateProduction => "duplicate production occurrence",
            Self::DuplicateNestedName => "duplicate nested production name",
            Self::LeftRecursion => "left recursion detected",
            Self::AmbiguousAlternatives => "ambiguous alternatives",
            Self::AmbiguousPrefixAlternatives => {
                "alternative is unreachable behind an earlier alternative"
            }
            Self::EmptyAlternative => "only the last alternative may match an empty sequence",
            Self::DeadRepetition => "repetition can never consume any tokens",
            Self::TooManyAlternatives => "an alternation may declare at most 256 alternatives",
            Self::InvalidRuleName => "invalid rule name",
            Self::InvalidNestedName => "invalid nested production name",
            Self::InvalidTokenName => "invalid token name",
            Self::NamespaceConflict => "name is used for both a rule and a token",
        }
    }

    /// Template for detailed messages; `{}` is replaced with
    /// caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::DuplicateRuleName => "rule `{}` is declared more than once".to_string(),
            Self::UnresolvedReference => "`{}` is not a declared rule".to_string(),
            Self::DuplicateNestedName => {
                "nested production name `{}` is used more than once".to_string()
            }
            Self::LeftRecursion => "left recursion detected: {}".to_string(),
            Self::InvalidRuleName => "`{}` is not a valid rule name".to_string(),
            Self::InvalidNestedName => "`{}` is not a valid nested production name".to_string(),
            Self::InvalidTokenName => "`{}` is not a valid token name".to_string(),
            Self::NamespaceConflict => {
                "`{}` is used as both a rule name and a token name".to_string()
            }
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message: the fallback when `detail` is `None`,
    /// otherwise the template with the detail substituted.
    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarDiagnostic {
    pub kind: DiagnosticKind,
    /// Rule the defect was found in; empty for grammar-level findings.
    pub rule_name: String,
    pub message: String,
    /// Occurrence index of the offending decision construct.
    pub occurrence: Option<u32>,
    /// 1-based alternative indices involved, for alternation findings.
    pub alternatives: Vec<usize>,
}

impl GrammarDiagnostic {
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl fmt::Display for GrammarDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rule_name.is_empty() {
            write!(f, "{}: {}", self.severity(), self.message)
        } else {
            write!(
                f,
                "{} in rule `{}`: {}",
                self.severity(),
                self.rule_name,
                self.message
            )
        }
    }
}

/// Collection of validation findings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    messages: Vec<GrammarDiagnostic>,
}

#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: GrammarDiagnostic,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Start a diagnostic for `rule_name` with the kind's fallback
    /// message. Call `.message()` on the builder to substitute detail.
    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        rule_name: impl Into<String>,
    ) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: GrammarDiagnostic {
                kind,
                rule_name: rule_name.into(),
                message: kind.fallback_message().to_string(),
                occurrence: None,
                alternatives: Vec::new(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn iter(&self) -> impl Iterator<Item = &GrammarDiagnostic> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[GrammarDiagnostic] {
        &self.messages
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    /// Findings of one kind, for targeted assertions and tooling.
    pub fn of_kind(&self, kind: DiagnosticKind) -> Vec<&GrammarDiagnostic> {
        self.messages.iter().filter(|d| d.kind == kind).collect()
    }

    /// One line per finding.
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl IntoIterator for Diagnostics {
    type Item = GrammarDiagnostic;
    type IntoIter = std::vec::IntoIter<GrammarDiagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a GrammarDiagnostic;
    type IntoIter = std::slice::Iter<'a, GrammarDiagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl<'a> DiagnosticBuilder<'a> {
    /// Substitute `detail` into the kind's message template.
    pub fn message(mut self, detail: impl AsRef<str>) -> Self {
        self.message.message = self.message.kind.message(Some(detail.as_ref()));
        self
    }

    pub fn occurrence(mut self, idx: u32) -> Self {
        self.message.occurrence = Some(idx);
        self
    }

    /// 1-based indices of the alternatives involved.
    pub fn alternatives(mut self, indices: impl Into<Vec<usize>>) -> Self {
        self.message.alternatives = indices.into();
        self
    }

    pub fn emit(self) {
        self.diagnostics.messages.push(self.message);
    }
}
