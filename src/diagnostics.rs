//! Source locations and the shared rendering of located errors.
//!
//! Both [`LexError`](crate::LexError) and [`ParseError`](crate::ParseError)
//! render as `[line:column] message near 'text'`.

use std::fmt;

/// Position of a diagnostic in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in bytes from the start of the line.
    pub column: usize,
    /// Absolute byte offset.
    pub offset: usize,
}

impl Location {
    /// Build a location from an absolute offset and the offset at which
    /// its line begins.
    #[must_use]
    pub const fn new(line: usize, line_start: usize, offset: usize) -> Self {
        Self {
            line,
            column: offset - line_start + 1,
            offset,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_is_one_based() {
        let loc = Location::new(3, 10, 10);
        assert_eq!(loc.column, 1);
        assert_eq!(loc.to_string(), "[3:1]");
    }

    #[test]
    fn column_counts_from_line_start() {
        let loc = Location::new(2, 5, 12);
        assert_eq!(loc.column, 8);
        assert_eq!(loc.offset, 12);
        assert_eq!(loc.to_string(), "[2:8]");
    }
}
