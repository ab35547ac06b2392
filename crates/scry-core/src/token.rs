//! Token types, the token-type registry, and tokens.
//!
//! The engine never tokenizes; it consumes tokens produced elsewhere.
//! Token types are plain numeric identities resolved through a registry
//! that also carries a human-readable label for diagnostics.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::span::Span;

/// Token type identity. Compared by equality everywhere; names and labels
/// live in the [`TokenTypeRegistry`].
pub type TokenTypeId = u16;

/// Registry of token types known to a grammar.
///
/// Registration order assigns ids. Late registration is allowed (see
/// `dynamic_tokens_enabled` in the parser configuration), which is why
/// lookahead caching can be relaxed but the registry itself never
/// invalidates existing ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenTypeRegistry {
    /// Name → id, preserving registration order.
    names: IndexMap<String, TokenTypeId>,
    /// Display label per id, `None` meaning "use the name".
    labels: Vec<Option<String>>,
}

impl TokenTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token type by name, returning its id. Registering an
    /// existing name returns the original id.
    pub fn register(&mut self, name: impl Into<String>) -> TokenTypeId {
        let name = name.into();
        if let Some(&id) = self.names.get(&name) {
            return id;
        }
        let id = self.names.len() as TokenTypeId;
        self.names.insert(name, id);
        self.labels.push(None);
        id
    }

    /// Register a token type with an explicit diagnostic label
    /// (e.g. name `LCurly`, label `{`).
    pub fn register_with_label(
        &mut self,
        name: impl Into<String>,
        label: impl Into<String>,
    ) -> TokenTypeId {
        let id = self.register(name);
        self.labels[id as usize] = Some(label.into());
        id
    }

    pub fn id_for(&self, name: &str) -> Option<TokenTypeId> {
        self.names.get(name).copied()
    }

    pub fn name(&self, id: TokenTypeId) -> Option<&str> {
        self.names.get_index(id as usize).map(|(name, _)| name.as_str())
    }

    /// Diagnostic label for a token type: the explicit label when one was
    /// registered, the name otherwise, a placeholder for unknown ids.
    pub fn label(&self, id: TokenTypeId) -> &str {
        match self.labels.get(id as usize) {
            Some(Some(label)) => label,
            Some(None) => self.name(id).unwrap_or("<unknown>"),
            None => "<unknown>",
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(id, name)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenTypeId, &str)> {
        self.names
            .iter()
            .map(|(name, &id)| (id, name.as_str()))
    }
}

/// A single input token: type identity, raw image, and source span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenTypeId,
    pub image: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenTypeId, image: impl Into<String>, span: Span) -> Self {
        Self {
            token_type,
            image: image.into(),
            span,
        }
    }
}
