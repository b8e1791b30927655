//! Source location tracking

use serde::{Deserialize, Serialize};

/// A span representing a range in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the start
    pub start: usize,
    /// Byte offset of the end (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Merge two spans into one that covers both
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The source text covered by this span, if it lies inside `source`
    pub fn text(self, source: &str) -> Option<&str> {
        source.get(self.start..self.end)
    }

    /// 1-based line and column of the span start
    pub fn line_col(self, source: &str) -> (usize, usize) {
        let upto = &source[..self.start.min(source.len())];
        let line = upto.matches('\n').count() + 1;
        let column = match upto.rfind('\n') {
            Some(newline) => upto[newline + 1..].chars().count() + 1,
            None => upto.chars().count() + 1,
        };
        (line, column)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::dummy()
    }
}
