use serde::{Deserialize, Serialize};
use std::fmt;

/// The region of a program an AST node or token came from.
///
/// Lines and columns count from 1. Serialized with the field names the
/// diagnostics JSON uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "line")]
    pub start_line: u32,
    #[serde(rename = "column")]
    pub start_col: u32,
    pub end_line: u32,
    #[serde(rename = "end_column")]
    pub end_col: u32,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// A span covering one character.
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// The smallest span covering both.
    pub fn merge(self, other: Span) -> Span {
        let (start_line, start_col) =
            (self.start_line, self.start_col).min((other.start_line, other.start_col));
        let (end_line, end_col) =
            (self.end_line, self.end_col).max((other.end_line, other.end_col));
        Span::new(start_line, start_col, end_line, end_col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// One named program text, indexed by line for diagnostic snippets.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
    /// `line_starts[i]` is the byte offset where line `i + 1` begins.
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            name: name.into(),
            source,
            line_starts,
        }
    }

    /// Text of line `line_number`, without its terminator.
    pub fn line(&self, line_number: u32) -> Option<&str> {
        let idx = line_number.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&s| s.saturating_sub(1))
            .unwrap_or(self.source.len());
        Some(self.source[start..end].trim_end_matches('\r'))
    }

    /// The source line a span starts on, or `""` when out of range.
    pub fn snippet(&self, span: Span) -> String {
        self.line(span.start_line).unwrap_or("").to_string()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_is_one_character() {
        let s = Span::point(1, 5);
        assert_eq!(s, Span::new(1, 5, 1, 5));
    }

    #[test]
    fn test_merge_spanning_two_lines() {
        let merged = Span::new(1, 5, 1, 10).merge(Span::new(2, 3, 2, 8));
        assert_eq!(merged, Span::new(1, 5, 2, 8));
    }

    #[test]
    fn test_merge_on_one_line_keeps_outer_columns() {
        let merged = Span::new(1, 5, 1, 10).merge(Span::new(1, 3, 1, 8));
        assert_eq!(merged.start_col, 3);
        assert_eq!(merged.end_col, 10);
    }

    #[test]
    fn test_display_shows_start_position() {
        assert_eq!(format!("{}", Span::new(3, 7, 3, 15)), "3:7");
    }

    #[test]
    fn test_span_json_field_names() {
        let json = serde_json::to_string(&Span::new(1, 2, 3, 4)).unwrap();
        assert_eq!(json, r#"{"line":1,"column":2,"end_line":3,"end_column":4}"#);
    }

    #[test]
    fn test_line_lookup_is_one_based() {
        let src = SourceFile::new("test.scm", "(define x 1)\n(+ x 2)\nx");
        assert_eq!(src.line(1), Some("(define x 1)"));
        assert_eq!(src.line(2), Some("(+ x 2)"));
        assert_eq!(src.line(3), Some("x"));
        assert_eq!(src.line(0), None);
        assert_eq!(src.line(4), None);
    }

    #[test]
    fn test_line_strips_carriage_return() {
        let src = SourceFile::new("test.scm", "(f 1)\r\n(g 2)\r\n");
        assert_eq!(src.line(1), Some("(f 1)"));
        assert_eq!(src.line(2), Some("(g 2)"));
    }

    #[test]
    fn test_snippet_out_of_range_is_empty() {
        let src = SourceFile::new("test.scm", "a\n(car null)");
        assert_eq!(src.snippet(Span::new(2, 1, 2, 10)), "(car null)");
        assert_eq!(src.snippet(Span::point(9, 1)), "");
    }

    #[test]
    fn test_empty_program_has_one_line() {
        let src = SourceFile::new("test.scm", "");
        assert_eq!(src.line_count(), 1);
        assert_eq!(src.line(1), Some(""));
    }
}
