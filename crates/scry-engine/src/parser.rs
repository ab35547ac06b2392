//! Public parser facade.

use std::sync::Arc;

use scry_core::{CstNode, ParserConfig, Token, TokenTypeRegistry};
use scry_grammar::{Diagnostics, Grammar, validate_grammar};

use crate::cache::{CacheKey, LookaheadCache};
use crate::engine::ParseSession;
use crate::errors::{EngineError, ParseError, Result};
use crate::lookahead::CompiledLookahead;

/// Outcome of one parse: the root CST node (absent when CST output is
/// disabled or the parse aborted) and every error encountered.
#[derive(Debug)]
pub struct ParseResult {
    pub cst: Option<CstNode>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A validated grammar bound to its token-type registry and
/// configuration, ready to execute parses.
///
/// Construction runs self-analysis once; a grammar with definition
/// errors is inspectable but refuses to parse. One parser may serve
/// concurrent parses: all shared state is immutable except the
/// lookahead cache, which tolerates racing first uses.
pub struct Parser {
    grammar: Grammar,
    registry: TokenTypeRegistry,
    config: ParserConfig,
    diagnostics: Diagnostics,
    cache: LookaheadCache,
}

impl Parser {
    pub fn new(grammar: Grammar, registry: TokenTypeRegistry, config: ParserConfig) -> Self {
        let diagnostics = validate_grammar(&grammar, &registry, &config);
        Self {
            grammar,
            registry,
            config,
            diagnostics,
            cache: LookaheadCache::new(),
        }
    }

    /// Findings of the construction-time self-analysis.
    pub fn definition_errors(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn registry(&self) -> &TokenTypeRegistry {
        &self.registry
    }

    /// Late token-type registration, meaningful together with
    /// `dynamic_tokens_enabled`.
    pub fn registry_mut(&mut self) -> &mut TokenTypeRegistry {
        &mut self.registry
    }

    /// Parse `tokens` starting at `rule_name`.
    pub fn parse(&self, rule_name: &str, tokens: &[Token]) -> Result<ParseResult> {
        if self.diagnostics.has_errors() {
            return Err(EngineError::InvalidGrammar {
                diagnostics: self.diagnostics.clone(),
            });
        }
        let rule = self
            .grammar
            .rule(rule_name)
            .ok_or_else(|| EngineError::UnknownRule {
                name: rule_name.to_string(),
            })?;
        let mut session = ParseSession::new(
            &self.grammar,
            &self.registry,
            &self.config,
            &self.cache,
            tokens,
        );
        let (cst, errors) = session.run(rule);
        Ok(ParseResult { cst, errors })
    }

    /// Compiled predicate for a decision point, for tooling. Present
    /// only after the decision has executed at least once.
    pub fn lookahead(&self, key: CacheKey) -> Option<Arc<CompiledLookahead>> {
        self.cache.get(&key)
    }
}
