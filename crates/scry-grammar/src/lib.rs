//! Grammar analysis for scry.
//!
//! The grammar tree model ([`tree`]), depth-first traversal ([`visitor`]),
//! derived structural predicates ([`props`]), bounded lookahead path
//! search ([`interp`]), and static validation ([`checks`]) with its
//! diagnostics vocabulary ([`diagnostics`]).
//!
//! A grammar is immutable once built. Validation reports defects without
//! failing fast; execution layers refuse grammars whose diagnostics
//! contain errors.

pub mod checks;
pub mod diagnostics;
pub mod interp;
pub mod props;
pub mod tree;
pub mod visitor;

#[cfg(test)]
mod diagnostics_tests;
#[cfg(test)]
mod interp_tests;
#[cfg(test)]
mod visitor_tests;

pub use checks::{MAX_ALTERNATIVES, NESTED_NAME_MARKER, validate_grammar};
pub use diagnostics::{DiagnosticKind, Diagnostics, GrammarDiagnostic, Severity};
pub use interp::{LookaheadPath, possible_paths_from};
pub use tree::{
    Alternation, Alternative, DslKind, Gate, Grammar, NonTerminal, Optional, Production,
    Repetition, RepetitionMandatory, RepetitionMandatoryWithSeparator, RepetitionWithSeparator,
    Rule, RuleId, Sequence, Terminal,
};
pub use visitor::GrammarVisitor;
