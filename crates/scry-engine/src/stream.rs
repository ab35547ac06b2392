//! Token stream cursor.

use scry_core::{Token, TokenTypeId};

/// Sequential cursor over a token slice with non-destructive lookahead.
///
/// Lookahead is 1-based: `la(1)` is the next unconsumed token, matching
/// how lookahead depth is counted everywhere else in the engine.
pub struct TokenStream<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> TokenStream<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// The `n`-th upcoming token without consuming, `None` past the end.
    pub fn la(&self, n: usize) -> Option<&'t Token> {
        debug_assert!(n > 0, "lookahead is 1-based");
        self.tokens.get(self.pos + n - 1)
    }

    /// Type of the `n`-th upcoming token.
    pub fn la_type(&self, n: usize) -> Option<TokenTypeId> {
        self.la(n).map(|tok| tok.token_type)
    }

    /// Consume and return the next token.
    pub fn advance(&mut self) -> Option<&'t Token> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

#[cfg(test)]
mod stream_tests {
    use scry_core::Span;

    use super::*;

    fn tokens() -> Vec<Token> {
        (0..3)
            .map(|i| Token::new(i as u16, "x", Span::new(i, i + 1, 1, 1, 1, 2)))
            .collect()
    }

    #[test]
    fn lookahead_does_not_consume() {
        let tokens = tokens();
        let stream = TokenStream::new(&tokens);
        assert_eq!(stream.la_type(1), Some(0));
        assert_eq!(stream.la_type(3), Some(2));
        assert_eq!(stream.la_type(4), None);
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn advance_moves_the_cursor() {
        let tokens = tokens();
        let mut stream = TokenStream::new(&tokens);
        assert_eq!(stream.advance().map(|t| t.token_type), Some(0));
        assert_eq!(stream.la_type(1), Some(1));
        stream.advance();
        stream.advance();
        assert!(stream.is_exhausted());
        assert!(stream.advance().is_none());
    }
}
