//! Parse-time and engine errors.

use scry_core::Token;
use scry_grammar::Diagnostics;
use thiserror::Error;

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Failure while executing a parse. Each variant carries the full rule
/// invocation stack at the point of failure, outermost rule first.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("{}", mismatched_msg(.expected, .actual, .rule_stack))]
    MismatchedToken {
        /// Label of the expected token type.
        expected: String,
        /// The offending token, `None` at end of input.
        actual: Option<Token>,
        rule_stack: Vec<String>,
    },

    #[error("{}", no_viable_msg(.decision, .actual, .rule_stack))]
    NoViableAlternative {
        /// Decision key of the alternation, e.g. `OR` or `OR2`.
        decision: String,
        actual: Option<Token>,
        rule_stack: Vec<String>,
    },

    #[error("parsing finished before all input was consumed, next token is `{}`", .first_unconsumed.image)]
    NotAllInputParsed { first_unconsumed: Token },
}

impl ParseError {
    pub fn rule_stack(&self) -> &[String] {
        match self {
            ParseError::MismatchedToken { rule_stack, .. }
            | ParseError::NoViableAlternative { rule_stack, .. } => rule_stack,
            ParseError::NotAllInputParsed { .. } => &[],
        }
    }
}

fn mismatched_msg(expected: &str, actual: &Option<Token>, stack: &[String]) -> String {
    format!(
        "expected {expected} but found {} (in rule {})",
        render_actual(actual),
        stack.join(" > ")
    )
}

fn no_viable_msg(decision: &str, actual: &Option<Token>, stack: &[String]) -> String {
    format!(
        "no viable alternative at {decision} for {} (in rule {})",
        render_actual(actual),
        stack.join(" > ")
    )
}

fn render_actual(actual: &Option<Token>) -> String {
    match actual {
        Some(tok) => format!("`{}`", tok.image),
        None => "end of input".to_string(),
    }
}

/// Failure to start a parse at all.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The grammar carries definition errors; running it would be
    /// meaningless or non-terminating.
    #[error("grammar has {} definition error(s)", .diagnostics.len())]
    InvalidGrammar { diagnostics: Diagnostics },

    #[error("`{name}` is not a rule of this grammar")]
    UnknownRule { name: String },
}
