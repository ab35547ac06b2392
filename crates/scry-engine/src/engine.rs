//! Tree-walking parse execution.
//!
//! One [`ParseSession`] per parse: it owns the stream cursor, the rule
//! invocation stack, and the CST frames. Decisions go through predicates
//! compiled lazily per `(rule, kind, occurrence)` key. A terminal
//! mismatch aborts the parse; the structured error carries the invocation
//! stack captured at the failure point.

use std::sync::Arc;

use scry_core::{CstNode, ParserConfig, Token, TokenTypeId, TokenTypeRegistry};
use scry_grammar::{Alternation, DslKind, Grammar, Production, Rule, RuleId, Terminal};

use crate::builder::CstBuilder;
use crate::cache::{CacheKey, LookaheadCache};
use crate::errors::ParseError;
use crate::lookahead::{CompiledLookahead, build_alt_predicate, build_enter_predicate};
use crate::stream::TokenStream;

pub(crate) struct ParseSession<'p> {
    grammar: &'p Grammar,
    registry: &'p TokenTypeRegistry,
    config: &'p ParserConfig,
    cache: &'p LookaheadCache,
    stream: TokenStream<'p>,
    rule_stack: Vec<String>,
    builder: CstBuilder,
}

impl<'p> ParseSession<'p> {
    pub(crate) fn new(
        grammar: &'p Grammar,
        registry: &'p TokenTypeRegistry,
        config: &'p ParserConfig,
        cache: &'p LookaheadCache,
        tokens: &'p [Token],
    ) -> Self {
        Self {
            grammar,
            registry,
            config,
            cache,
            stream: TokenStream::new(tokens),
            rule_stack: Vec::new(),
            builder: CstBuilder::new(config.output_cst),
        }
    }

    /// Execute `rule` against the full input.
    pub(crate) fn run(&mut self, rule: &'p Rule) -> (Option<CstNode>, Vec<ParseError>) {
        let mut errors = Vec::new();
        let cst = match self.invoke(rule, &rule.name) {
            Ok(root) => root,
            Err(err) => {
                errors.push(err);
                None
            }
        };
        if errors.is_empty()
            && let Some(tok) = self.stream.la(1)
        {
            errors.push(ParseError::NotAllInputParsed {
                first_unconsumed: tok.clone(),
            });
        }
        (cst, errors)
    }

    /// Push a frame, execute the rule body, attach the node to the
    /// enclosing frame under `key`. Returns the node only for the
    /// outermost invocation.
    fn invoke(&mut self, rule: &'p Rule, key: &str) -> Result<Option<CstNode>, ParseError> {
        let rule_id = self
            .grammar
            .rule_id(&rule.name)
            .expect("invoked rule is registered");
        self.rule_stack.push(rule.name.clone());
        self.builder.begin(&rule.name);
        let outcome = self.execute_all(rule_id, &rule.body);
        self.rule_stack.pop();
        match outcome {
            Ok(()) => Ok(self.builder.finish(key)),
            Err(err) => {
                self.builder.abandon();
                Err(err)
            }
        }
    }

    fn execute_all(&mut self, rule_id: RuleId, elements: &'p [Production]) -> Result<(), ParseError> {
        for prod in elements {
            self.execute(rule_id, prod)?;
        }
        Ok(())
    }

    fn execute(&mut self, rule_id: RuleId, prod: &'p Production) -> Result<(), ParseError> {
        match prod {
            Production::Terminal(t) => self.consume(t),
            Production::NonTerminal(nt) => {
                let rule = self
                    .grammar
                    .rule(&nt.rule_name)
                    .expect("references resolved during validation");
                let key = nt.label.as_deref().unwrap_or(&rule.name);
                self.invoke(rule, key)?;
                Ok(())
            }
            Production::Sequence(s) => {
                self.in_named_frame(s.name.as_deref(), |me| me.execute_all(rule_id, &s.elements))
            }
            Production::Optional(o) => {
                let pred = self.enter_predicate(rule_id, DslKind::Option, o.idx, prod);
                if self.enter_matches(&pred) {
                    self.in_named_frame(o.name.as_deref(), |me| {
                        me.execute_all(rule_id, &o.elements)
                    })
                } else {
                    Ok(())
                }
            }
            Production::Repetition(r) => {
                let pred = self.enter_predicate(rule_id, DslKind::Many, r.idx, prod);
                self.in_named_frame(r.name.as_deref(), |me| {
                    while me.enter_matches(&pred) {
                        me.execute_all(rule_id, &r.elements)?;
                    }
                    Ok(())
                })
            }
            Production::RepetitionMandatory(r) => {
                let pred = self.enter_predicate(rule_id, DslKind::AtLeastOne, r.idx, prod);
                self.in_named_frame(r.name.as_deref(), |me| {
                    // The first iteration is unconditional; a missing body
                    // surfaces as a mismatch inside it.
                    me.execute_all(rule_id, &r.elements)?;
                    while me.enter_matches(&pred) {
                        me.execute_all(rule_id, &r.elements)?;
                    }
                    Ok(())
                })
            }
            Production::RepetitionWithSeparator(r) => {
                let pred = self.enter_predicate(rule_id, DslKind::ManySep, r.idx, prod);
                self.in_named_frame(r.name.as_deref(), |me| {
                    if me.enter_matches(&pred) {
                        me.execute_all(rule_id, &r.elements)?;
                        me.separated_iterations(rule_id, r.separator, &r.elements)?;
                    }
                    Ok(())
                })
            }
            Production::RepetitionMandatoryWithSeparator(r) => {
                self.in_named_frame(r.name.as_deref(), |me| {
                    me.execute_all(rule_id, &r.elements)?;
                    me.separated_iterations(rule_id, r.separator, &r.elements)
                })
            }
            Production::Alternation(a) => self.execute_alternation(rule_id, a),
        }
    }

    /// Subsequent iterations of a separated loop continue on a direct
    /// separator match, no compiled predicate needed.
    fn separated_iterations(
        &mut self,
        rule_id: RuleId,
        separator: TokenTypeId,
        elements: &'p [Production],
    ) -> Result<(), ParseError> {
        while self.stream.la_type(1) == Some(separator) {
            let tok = self
                .stream
                .advance()
                .expect("separator presence just checked");
            let key = self.registry.name(separator).unwrap_or("<unknown>");
            self.builder.add_token(key, tok);
            self.execute_all(rule_id, elements)?;
        }
        Ok(())
    }

    fn execute_alternation(
        &mut self,
        rule_id: RuleId,
        alternation: &'p Alternation,
    ) -> Result<(), ParseError> {
        let pred = self.alt_predicate(rule_id, alternation);
        let predicate = pred.as_alt().expect("alternation compiles to an alt predicate");
        let live: Vec<bool> = alternation
            .alternatives
            .iter()
            .map(|alternative| alternative.gate.as_ref().map_or(true, |gate| gate()))
            .collect();

        let chosen = predicate.choose(&live, |n| self.stream.la_type(n));
        match chosen {
            Some(i) => {
                let alternative = &alternation.alternatives[i];
                self.in_named_frame(alternation.name.as_deref(), |me| {
                    me.in_named_frame(alternative.name.as_deref(), |me| {
                        me.execute_all(rule_id, &alternative.elements)
                    })
                })
            }
            None => Err(ParseError::NoViableAlternative {
                decision: DslKind::Or.decision_key(alternation.idx),
                actual: self.stream.la(1).cloned(),
                rule_stack: self.rule_stack.clone(),
            }),
        }
    }

    fn consume(&mut self, terminal: &Terminal) -> Result<(), ParseError> {
        match self.stream.la(1) {
            Some(tok) if tok.token_type == terminal.token_type => {
                let tok = self.stream.advance().expect("la(1) is present");
                let key = terminal.label.as_deref().unwrap_or_else(|| {
                    self.registry.name(terminal.token_type).unwrap_or("<unknown>")
                });
                self.builder.add_token(key, tok);
                Ok(())
            }
            actual => Err(ParseError::MismatchedToken {
                expected: self.registry.label(terminal.token_type).to_string(),
                actual: actual.cloned(),
                rule_stack: self.rule_stack.clone(),
            }),
        }
    }

    fn enter_matches(&self, pred: &CompiledLookahead) -> bool {
        pred.as_enter()
            .expect("optional construct compiles to an enter predicate")
            .matches(|n| self.stream.la_type(n))
    }

    fn in_named_frame(
        &mut self,
        name: Option<&str>,
        body: impl FnOnce(&mut Self) -> Result<(), ParseError>,
    ) -> Result<(), ParseError> {
        let Some(name) = name else {
            return body(self);
        };
        self.builder.begin(name);
        match body(self) {
            Ok(()) => {
                let root = self.builder.finish(name);
                debug_assert!(root.is_none(), "named frame is never outermost");
                Ok(())
            }
            Err(err) => {
                self.builder.abandon();
                Err(err)
            }
        }
    }

    fn alt_predicate(
        &self,
        rule_id: RuleId,
        alternation: &Alternation,
    ) -> Arc<CompiledLookahead> {
        let build = || {
            CompiledLookahead::Alt(build_alt_predicate(
                self.grammar,
                alternation,
                self.config.max_lookahead,
            ))
        };
        // Late-registered token types may change path sets between
        // parses, so caching is bypassed entirely.
        if self.config.dynamic_tokens_enabled {
            return Arc::new(build());
        }
        let key = CacheKey {
            rule: rule_id,
            kind: DslKind::Or,
            occurrence: alternation.idx,
        };
        self.cache.get_or_insert_with(key, build)
    }

    fn enter_predicate(
        &self,
        rule_id: RuleId,
        kind: DslKind,
        occurrence: u32,
        decision: &Production,
    ) -> Arc<CompiledLookahead> {
        let build = || {
            CompiledLookahead::Enter(build_enter_predicate(
                self.grammar,
                decision,
                self.config.max_lookahead,
            ))
        };
        if self.config.dynamic_tokens_enabled {
            return Arc::new(build());
        }
        let key = CacheKey {
            rule: rule_id,
            kind,
            occurrence,
        };
        self.cache.get_or_insert_with(key, build)
    }
}
