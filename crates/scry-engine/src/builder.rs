//! CST construction during rule execution.
//!
//! A frame is opened per rule invocation and per named nested production;
//! closing a frame attaches its node to the parent under the chosen key
//! and merges spans. When CST output is disabled every operation is a
//! no-op and the parse produces no tree, with identical consumption and
//! branching behavior.

use scry_core::{CstNode, Token};

pub(crate) struct CstBuilder {
    enabled: bool,
    stack: Vec<CstNode>,
}

impl CstBuilder {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            stack: Vec::new(),
        }
    }

    /// Open a frame for a rule invocation or named nested production.
    pub(crate) fn begin(&mut self, name: &str) {
        if self.enabled {
            self.stack.push(CstNode::new(name));
        }
    }

    /// Close the current frame. The node attaches to the parent frame
    /// under `key`; the outermost frame is returned instead.
    pub(crate) fn finish(&mut self, key: &str) -> Option<CstNode> {
        if !self.enabled {
            return None;
        }
        let node = self
            .stack
            .pop()
            .expect("finish called without a matching begin");
        match self.stack.last_mut() {
            Some(parent) => {
                parent.add_node(key, node);
                None
            }
            None => Some(node),
        }
    }

    /// Discard the current frame after a failed invocation.
    pub(crate) fn abandon(&mut self) {
        if self.enabled {
            self.stack
                .pop()
                .expect("abandon called without a matching begin");
        }
    }

    /// Record a consumed token in the current frame.
    pub(crate) fn add_token(&mut self, key: &str, token: &Token) {
        if self.enabled
            && let Some(top) = self.stack.last_mut()
        {
            top.add_token(key, token.clone());
        }
    }
}
