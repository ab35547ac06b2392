//! Source position spans.

use serde::{Deserialize, Serialize};

/// Position information for a token or CST node.
///
/// Offsets are byte positions into the original input; lines and columns
/// are 1-based, matching what lexers commonly produce. The six fields are
/// carried separately (rather than two point structs) so a span can be
/// grown cheaply as children attach to a CST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_offset: usize,
    pub end_offset: usize,
    pub start_line: u32,
    pub end_line: u32,
    pub start_column: u32,
    pub end_column: u32,
}

impl Span {
    pub fn new(
        start_offset: usize,
        end_offset: usize,
        start_line: u32,
        end_line: u32,
        start_column: u32,
        end_column: u32,
    ) -> Self {
        Self {
            start_offset,
            end_offset,
            start_line,
            end_line,
            start_column,
            end_column,
        }
    }

    /// Sentinel span for a node that has not absorbed any child yet.
    ///
    /// Start fields hold MAX so the first `grow` always wins the min
    /// comparison; end fields hold 0 so it always wins the max.
    pub fn unset() -> Self {
        Self {
            start_offset: usize::MAX,
            end_offset: 0,
            start_line: u32::MAX,
            end_line: 0,
            start_column: u32::MAX,
            end_column: 0,
        }
    }

    /// True until the first `grow` call.
    pub fn is_unset(&self) -> bool {
        self.start_offset == usize::MAX
    }

    /// Extend this span to cover `other`. Growth is monotonic: the start
    /// can only move earlier and the end can only move later.
    pub fn grow(&mut self, other: &Span) {
        if other.is_unset() {
            return;
        }
        if other.start_offset < self.start_offset {
            self.start_offset = other.start_offset;
            self.start_line = other.start_line;
            self.start_column = other.start_column;
        }
        // end_line is 0 only on the unset sentinel, where any real end wins
        // even when both offsets are 0 (zero-width tokens at input start).
        if other.end_offset > self.end_offset || self.end_line == 0 {
            self.end_offset = other.end_offset;
            self.end_line = other.end_line;
            self.end_column = other.end_column;
        }
    }
}

#[cfg(test)]
mod span_tests {
    use super::*;

    #[test]
    fn grow_is_monotonic() {
        let mut span = Span::unset();
        assert!(span.is_unset());

        span.grow(&Span::new(4, 7, 1, 1, 5, 8));
        assert_eq!(span.start_offset, 4);
        assert_eq!(span.end_offset, 7);
        assert!(!span.is_unset());

        // A later child extends the end, leaves the start.
        span.grow(&Span::new(8, 12, 2, 2, 1, 5));
        assert_eq!(span.start_offset, 4);
        assert_eq!(span.end_offset, 12);
        assert_eq!(span.end_line, 2);

        // An earlier child (merged from a sibling subtree) moves the start.
        span.grow(&Span::new(0, 3, 1, 1, 1, 4));
        assert_eq!(span.start_offset, 0);
        assert_eq!(span.start_column, 1);
        assert_eq!(span.end_offset, 12);
    }
}
