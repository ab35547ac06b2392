//! Concrete syntax tree nodes.
//!
//! A CST node records every token a rule invocation consumed and every
//! nested invocation it made, grouped under child keys. A key may recur
//! (a terminal consumed inside a loop, a subrule invoked twice), so each
//! key maps to a list. Keys preserve insertion order; interleaving across
//! keys is recovered from spans, which grow monotonically as children
//! attach.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::span::Span;
use crate::token::Token;

/// A child of a CST node: either a consumed token or a nested node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CstChild {
    Token(Token),
    Node(CstNode),
}

impl CstChild {
    pub fn span(&self) -> &Span {
        match self {
            CstChild::Token(tok) => &tok.span,
            CstChild::Node(node) => &node.span,
        }
    }
}

/// Concrete syntax tree node built during rule invocation.
///
/// Owned exclusively by the active invocation frame until the frame
/// returns, then attached as a named child of the parent frame's node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CstNode {
    pub name: String,
    pub children: IndexMap<String, Vec<CstChild>>,
    pub span: Span,
}

impl CstNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: IndexMap::new(),
            span: Span::unset(),
        }
    }

    /// Append a consumed token under `key` and grow the node span.
    pub fn add_token(&mut self, key: impl Into<String>, token: Token) {
        self.span.grow(&token.span);
        self.children
            .entry(key.into())
            .or_default()
            .push(CstChild::Token(token));
    }

    /// Append a nested node under `key` and merge its span into ours.
    pub fn add_node(&mut self, key: impl Into<String>, node: CstNode) {
        self.span.grow(&node.span);
        self.children
            .entry(key.into())
            .or_default()
            .push(CstChild::Node(node));
    }

    /// Children recorded under `key`, empty when the key never occurred.
    pub fn get(&self, key: &str) -> &[CstChild] {
        self.children.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Direct children in source order.
    ///
    /// The keyed map loses interleaving across keys; consumption order is
    /// recovered by sorting on span starts, which are strictly increasing
    /// over the tokens one parse consumed.
    pub fn children_in_source_order(&self) -> Vec<&CstChild> {
        let mut all: Vec<&CstChild> = self.children.values().flatten().collect();
        all.sort_by_key(|child| child.span().start_offset);
        all
    }

    /// All tokens in this subtree, in source order.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        for child in self.children_in_source_order() {
            match child {
                CstChild::Token(tok) => out.push(tok),
                CstChild::Node(node) => node.collect_tokens(out),
            }
        }
    }

    /// Concatenated images of all tokens in this subtree, in source order.
    pub fn to_text(&self) -> String {
        self.tokens().iter().map(|tok| tok.image.as_str()).collect()
    }
}

#[cfg(test)]
mod cst_tests {
    use super::*;

    fn tok(tt: u16, image: &str, offset: usize) -> Token {
        let end = offset + image.len();
        Token::new(
            tt,
            image,
            Span::new(offset, end, 1, 1, offset as u32 + 1, end as u32 + 1),
        )
    }

    #[test]
    fn children_accumulate_under_recurring_keys() {
        let mut node = CstNode::new("list");
        node.add_token("Item", tok(0, "a", 0));
        node.add_token("Comma", tok(1, ",", 1));
        node.add_token("Item", tok(0, "b", 2));

        assert_eq!(node.get("Item").len(), 2);
        assert_eq!(node.get("Comma").len(), 1);
        assert!(node.get("Missing").is_empty());
    }

    #[test]
    fn span_covers_all_children() {
        let mut node = CstNode::new("pair");
        node.add_token("Key", tok(0, "k", 3));
        node.add_token("Value", tok(1, "v", 9));

        assert_eq!(node.span.start_offset, 3);
        assert_eq!(node.span.end_offset, 10);
    }

    #[test]
    fn source_order_walk_restores_interleaving() {
        // Consumption order a , b — stored as Item:[a,b], Comma:[,].
        let mut node = CstNode::new("list");
        node.add_token("Item", tok(0, "a", 0));
        node.add_token("Comma", tok(1, ",", 1));
        node.add_token("Item", tok(0, "b", 2));

        assert_eq!(node.to_text(), "a,b");
    }

    #[test]
    fn serde_round_trip_preserves_structure() {
        let mut inner = CstNode::new("inner");
        inner.add_token("B", tok(1, "b", 1));

        let mut outer = CstNode::new("outer");
        outer.add_token("A", tok(0, "a", 0));
        outer.add_node("inner", inner);

        let json = serde_json::to_string(&outer).unwrap();
        let back: CstNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outer);
    }

    #[test]
    fn nested_nodes_contribute_tokens_in_order() {
        let mut inner = CstNode::new("inner");
        inner.add_token("B", tok(1, "b", 1));

        let mut outer = CstNode::new("outer");
        outer.add_token("A", tok(0, "a", 0));
        outer.add_node("inner", inner);
        outer.add_token("C", tok(2, "c", 2));

        assert_eq!(outer.to_text(), "abc");
        assert_eq!(outer.span.start_offset, 0);
        assert_eq!(outer.span.end_offset, 3);
    }
}
