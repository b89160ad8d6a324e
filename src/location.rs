//! Source locations attached to every parsed construct and every issue.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A position (and optional span) within one source file.
///
/// Lines are 1-based, columns are 0-based, matching the convention most
/// HTML/JS tokenizers already use internally; `length` is the span in UTF-16
/// code units when known, and is left `None` when a construct has no natural
/// extent (e.g. a synthesized location).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: Arc<str>,
    pub line: u32,
    pub column: u32,
    pub length: Option<u32>,
}

impl SourceLocation {
    pub fn new(file: Arc<str>, line: u32, column: u32) -> Self {
        SourceLocation {
            file,
            line,
            column,
            length: None,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// A placeholder location for model-level diagnostics that are not
    /// anchored to one specific source position.
    pub fn unknown(file: Arc<str>) -> Self {
        SourceLocation {
            file,
            line: 0,
            column: 0,
            length: None,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Orders by file, then line, then column — the sort key the orchestrator
/// uses for the final stable issue ordering.
impl PartialOrd for SourceLocation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceLocation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.file
            .cmp(&other.file)
            .then(self.line.cmp(&other.line))
            .then(self.column.cmp(&other.column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_file_then_line_then_column() {
        let a = SourceLocation::new(Arc::from("a.html"), 1, 0);
        let b = SourceLocation::new(Arc::from("a.html"), 2, 0);
        let c = SourceLocation::new(Arc::from("b.html"), 1, 0);
        assert!(a < b);
        assert!(b < c);
    }
}
